//! HTTP surface modules (router, handlers, middleware).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{error, warn};
use vfxpipe_api_models::decode_request;
use vfxpipe_fsops::FsOpsService;

use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Shared constants and problem URIs.
pub mod constants;
/// Problem response helpers and error types.
pub mod errors;
/// Health, ping, and metrics endpoints.
pub mod health;
/// Ingestion endpoint.
pub mod ingest;
/// Directory listing endpoint.
pub mod listing;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
/// Workspace provisioning endpoint.
pub mod workspace;

/// Decode a JSON body, accepting a double-encoded JSON string.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    decode_request(body).map_err(|err| {
        warn!(error = %err, "rejected malformed request body");
        ApiError::bad_request(format!("request body is invalid: {err}"))
    })
}

/// Run a synchronous engine call on the blocking pool.
async fn run_engine<T, F>(state: &Arc<ApiState>, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&FsOpsService) -> T + Send + 'static,
{
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || call(&engine))
        .await
        .map_err(|err| {
            error!(error = %err, "engine task did not complete");
            ApiError::internal("engine task did not complete")
        })
}
