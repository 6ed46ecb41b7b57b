//! `POST /create_workspace`.

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use tracing::error;
use vfxpipe_api_models::{CreateWorkspaceRequest, CreateWorkspaceResponse};
use vfxpipe_fsops::WorkspaceRequest;

use super::{decode_body, run_engine};
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn create_workspace(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<CreateWorkspaceResponse>, ApiError> {
    let request: CreateWorkspaceRequest = decode_body(&body)?;
    request.validate().map_err(|params| {
        ApiError::bad_request("workspace request is invalid").with_invalid_params(params)
    })?;
    let request = WorkspaceRequest::from(request);

    let outcome = run_engine(&state, move |engine| engine.provision_workspace(&request)).await?;
    match outcome {
        Ok(result) => Ok(Json(CreateWorkspaceResponse::from(result))),
        Err(err) => {
            error!(error = %err.describe(), "workspace provisioning failed");
            Err(ApiError::internal("workspace provisioning failed"))
        }
    }
}
