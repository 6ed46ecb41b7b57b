#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the vfxpipe API.
//!
//! The server and the CLI both encode and decode through these types, so the
//! wire field names live in exactly one place. Conversions to and from the
//! engine's request and result types sit next to the DTOs.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use vfxpipe_fsops::ListingEntry;
use vfxpipe_fsops::paths::validate_segment;
use vfxpipe_fsops::{
    DirectoryListing, DirectoryListingRequest, FsOpsError, IngestMode, IngestionRequest,
    IngestionResult, WorkspaceRequest, WorkspaceResult, render_issues,
};

/// RFC9457-compatible problem document surfaced on validation/runtime errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    /// URI reference identifying the problem type.
    pub kind: String,
    /// Short, human-readable summary of the issue.
    pub title: String,
    /// HTTP status code associated with the error.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic message when available.
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Parameters that failed validation, if applicable.
    pub invalid_params: Option<Vec<ProblemInvalidParam>>,
}

/// Invalid parameter pointer surfaced alongside a [`ProblemDetails`] payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemInvalidParam {
    /// JSON Pointer to the offending field.
    pub pointer: String,
    /// Human-readable description of the validation failure.
    pub message: String,
}

impl ProblemInvalidParam {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            pointer: format!("/{field}"),
            message: message.into(),
        }
    }

    fn empty(field: &str) -> Self {
        Self::new(field, "must not be empty")
    }
}

/// How a request field is checked before it reaches the engine.
#[derive(Clone, Copy)]
enum Field<'a> {
    /// Any non-blank value.
    Required(&'static str, &'a str),
    /// A single directory or file name component.
    Segment(&'static str, &'a str),
}

impl Field<'_> {
    fn check(self) -> Option<ProblemInvalidParam> {
        match self {
            Self::Required(name, value) | Self::Segment(name, value) if value.trim().is_empty() => {
                Some(ProblemInvalidParam::empty(name))
            }
            Self::Required(..) => None,
            Self::Segment(name, value) => match validate_segment(name, value) {
                Ok(()) => None,
                Err(FsOpsError::InvalidInput {
                    reason: "contains_separator",
                    ..
                }) => Some(ProblemInvalidParam::new(
                    name,
                    "must not contain '/' or '\\'",
                )),
                Err(FsOpsError::InvalidInput {
                    reason: "relative_segment",
                    ..
                }) => Some(ProblemInvalidParam::new(name, "must not be '.' or '..'")),
                Err(err) => Some(ProblemInvalidParam::new(name, err.describe())),
            },
        }
    }
}

fn check_fields(fields: &[Field<'_>]) -> Result<(), Vec<ProblemInvalidParam>> {
    let invalid: Vec<_> = fields.iter().filter_map(|field| field.check()).collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(invalid)
    }
}

/// Decode a request body that is either a JSON object or a JSON string
/// holding an encoded object.
///
/// # Errors
///
/// Returns the JSON error when neither form decodes into `T`.
pub fn decode_request<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    match serde_json::from_slice::<Value>(body)? {
        Value::String(encoded) => serde_json::from_str(&encoded),
        value => serde_json::from_value(value),
    }
}

/// Response body for `GET /ping`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingResponse {
    /// Always `Pong!`.
    pub message: String,
}

impl Default for PingResponse {
    fn default() -> Self {
        Self {
            message: "Pong!".to_string(),
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// `ok` while the service is serving.
    pub status: String,
    /// Build identifier.
    pub build: String,
    /// Files copied since start-up.
    #[serde(default)]
    pub files_copied_total: u64,
    /// Version reservation collisions since start-up.
    #[serde(default)]
    pub version_collisions_total: u64,
}

/// Body of `POST /create_workspace`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateWorkspaceRequest {
    /// Project code.
    pub project: String,
    /// Sequence name.
    pub sequence: String,
    /// Shot name.
    pub shot: String,
    /// Department; selects the template tree.
    pub department: String,
    /// Requesting user.
    pub user: String,
}

impl CreateWorkspaceRequest {
    /// Reject empty fields and unusable path segments before any filesystem access.
    ///
    /// # Errors
    ///
    /// Returns one entry per rejected field.
    pub fn validate(&self) -> Result<(), Vec<ProblemInvalidParam>> {
        check_fields(&[
            Field::Segment("project", &self.project),
            Field::Segment("sequence", &self.sequence),
            Field::Segment("shot", &self.shot),
            Field::Segment("department", &self.department),
            Field::Required("user", &self.user),
        ])
    }
}

impl From<CreateWorkspaceRequest> for WorkspaceRequest {
    fn from(value: CreateWorkspaceRequest) -> Self {
        Self {
            project: value.project,
            sequence: value.sequence,
            shot: value.shot,
            department: value.department,
            user: value.user,
        }
    }
}

/// Response body of `POST /create_workspace`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateWorkspaceResponse {
    /// `true` when the template was copied in full.
    pub result: bool,
    /// Provisioned department directory, empty when none was produced.
    pub destination: String,
    /// Template tree consulted.
    pub template_used: String,
    /// Issues one per line, or `null`.
    pub error: Option<String>,
}

impl From<WorkspaceResult> for CreateWorkspaceResponse {
    fn from(value: WorkspaceResult) -> Self {
        Self {
            result: value.success,
            destination: value
                .destination
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            template_used: value.template_used.display().to_string(),
            error: render_issues(&value.errors),
        }
    }
}

/// Body of `POST /get_files_folders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilesFoldersRequest {
    /// Base path; backslashes are accepted as separators.
    pub search_path: String,
    /// Folder under `search_path` to list.
    pub folders_to_search: String,
    /// Optional extension filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl FilesFoldersRequest {
    /// Reject an empty search path.
    ///
    /// # Errors
    ///
    /// Returns an entry for `search_path` when it is empty.
    pub fn validate(&self) -> Result<(), Vec<ProblemInvalidParam>> {
        check_fields(&[Field::Required("search_path", &self.search_path)])
    }
}

impl From<FilesFoldersRequest> for DirectoryListingRequest {
    fn from(value: FilesFoldersRequest) -> Self {
        Self {
            search_path: value.search_path,
            folders_to_search: value.folders_to_search,
            extension: value.extension,
        }
    }
}

/// Successful response of `POST /get_files_folders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilesFoldersResponse {
    /// Directory that was listed.
    pub search_path: String,
    /// Sequences as `[first, last]` pairs, then standalone names.
    pub files_found: Vec<ListingEntry>,
}

impl From<DirectoryListing> for FilesFoldersResponse {
    fn from(value: DirectoryListing) -> Self {
        Self {
            search_path: value.search_path.display().to_string(),
            files_found: value.entries,
        }
    }
}

/// Failure response of `POST /get_files_folders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilesFoldersError {
    /// Description of why the path could not be listed.
    pub error: String,
}

/// Body of `POST /ingest_request`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestRequest {
    /// Project code.
    pub project: String,
    /// Sequence name.
    pub sequence: String,
    /// Shot name.
    pub shot: String,
    /// Department receiving the media.
    pub department: String,
    /// Asset type folder.
    #[serde(rename = "type")]
    pub asset_type: String,
    /// `true` when `src_path` is a directory of frames.
    pub is_sequence: bool,
    /// Delivered file or directory.
    pub src_path: String,
    /// Extension to match and write.
    pub extension: String,
    /// Base name for the renamed output.
    pub naming_scheme: String,
    /// Embed the version label in output names.
    pub versioning: bool,
    /// Requesting user.
    pub user: String,
}

impl IngestRequest {
    /// Reject empty fields and unusable path segments before any filesystem access.
    ///
    /// The extension is checked without its leading dot.
    ///
    /// # Errors
    ///
    /// Returns one entry per rejected field.
    pub fn validate(&self) -> Result<(), Vec<ProblemInvalidParam>> {
        check_fields(&[
            Field::Segment("project", &self.project),
            Field::Segment("sequence", &self.sequence),
            Field::Segment("shot", &self.shot),
            Field::Segment("department", &self.department),
            Field::Segment("type", &self.asset_type),
            Field::Required("src_path", &self.src_path),
            Field::Segment(
                "extension",
                self.extension.trim().trim_start_matches('.'),
            ),
            Field::Segment("naming_scheme", &self.naming_scheme),
            Field::Required("user", &self.user),
        ])
    }
}

impl From<IngestRequest> for IngestionRequest {
    fn from(value: IngestRequest) -> Self {
        Self {
            project: value.project,
            sequence: value.sequence,
            shot: value.shot,
            department: value.department,
            asset_type: value.asset_type,
            mode: IngestMode::from_flag(value.is_sequence),
            src_path: PathBuf::from(value.src_path),
            extension: value.extension,
            naming_scheme: value.naming_scheme,
            versioning: value.versioning,
            user: value.user,
        }
    }
}

/// Response body of `POST /ingest_request`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestResponse {
    /// `true` only when every planned copy succeeded.
    pub result: bool,
    /// Written file or version directory, or `null`.
    pub destination_path: Option<String>,
    /// Source path as requested.
    pub source_path: String,
    /// Issues one per line, or `null`.
    pub error: Option<String>,
}

impl From<IngestionResult> for IngestResponse {
    fn from(value: IngestionResult) -> Self {
        Self {
            result: value.success,
            destination_path: value
                .destination_path
                .map(|path| path.display().to_string()),
            source_path: value.source_path.display().to_string(),
            error: render_issues(&value.errors),
        }
    }
}
