//! `POST /get_files_folders`.
//!
//! Lookup failures answer with a bare `{error}` body, matching the success
//! shape's flat layout rather than a problem document.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};
use vfxpipe_api_models::{FilesFoldersError, FilesFoldersRequest, FilesFoldersResponse};
use vfxpipe_fsops::{DirectoryListingRequest, FsOpsError};

use super::{decode_body, run_engine};
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) enum ListingRejection {
    Lookup(StatusCode, String),
    Api(ApiError),
}

impl From<ApiError> for ListingRejection {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<FsOpsError> for ListingRejection {
    fn from(value: FsOpsError) -> Self {
        match value {
            FsOpsError::PathNotFound { .. } => Self::Lookup(StatusCode::NOT_FOUND, value.describe()),
            FsOpsError::InvalidInput { .. } | FsOpsError::PathTypeMismatch { .. } => {
                Self::Lookup(StatusCode::BAD_REQUEST, value.describe())
            }
            other => {
                error!(error = %other.describe(), "directory listing failed");
                Self::Api(ApiError::internal("directory listing failed"))
            }
        }
    }
}

impl IntoResponse for ListingRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Lookup(status, error) => {
                info!(status = status.as_u16(), error = %error, "directory listing rejected");
                (status, Json(FilesFoldersError { error })).into_response()
            }
            Self::Api(error) => error.into_response(),
        }
    }
}

pub(crate) async fn get_files_folders(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<FilesFoldersResponse>, ListingRejection> {
    let request: FilesFoldersRequest = decode_body(&body)?;
    request.validate().map_err(|params| {
        ApiError::bad_request("listing request is invalid").with_invalid_params(params)
    })?;
    let request = DirectoryListingRequest::from(request);

    let listing = run_engine(&state, move |engine| engine.list_directory(&request)).await??;
    Ok(Json(FilesFoldersResponse::from(listing)))
}
