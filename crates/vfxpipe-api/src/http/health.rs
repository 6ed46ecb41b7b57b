//! Liveness, health, and metrics endpoints.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use tracing::error;
use vfxpipe_api_models::{HealthResponse, PingResponse};
use vfxpipe_telemetry::build_sha;

use crate::http::constants::METRICS_CONTENT_TYPE;
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn ping() -> Json<PingResponse> {
    Json(PingResponse::default())
}

pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let snapshot = state.telemetry.snapshot();
    Json(HealthResponse {
        status: "ok".to_string(),
        build: build_sha().to_string(),
        files_copied_total: snapshot.files_copied_total,
        version_collisions_total: snapshot.version_collisions_total,
    })
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, METRICS_CONTENT_TYPE)
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}

pub(crate) async fn unknown_route() -> ApiError {
    ApiError::not_found("no such route")
}
