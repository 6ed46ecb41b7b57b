//! `POST /ingest_request`.
//!
//! Engine outcomes, including `result=false`, are returned with `200`.

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use tracing::error;
use vfxpipe_api_models::{IngestRequest, IngestResponse};
use vfxpipe_fsops::IngestionRequest;

use super::{decode_body, run_engine};
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn ingest_request(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let request: IngestRequest = decode_body(&body)?;
    request.validate().map_err(|params| {
        ApiError::bad_request("ingest request is invalid").with_invalid_params(params)
    })?;
    let request = IngestionRequest::from(request);

    let outcome = run_engine(&state, move |engine| engine.ingest(&request)).await?;
    match outcome {
        Ok(result) => Ok(Json(IngestResponse::from(result))),
        Err(err) => {
            error!(error = %err.describe(), "ingestion failed");
            Err(ApiError::internal("ingestion failed"))
        }
    }
}
