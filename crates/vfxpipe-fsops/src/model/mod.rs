//! Domain models for workspace provisioning, listing, and ingestion.
//!
//! # Design
//! - Requests and results are per-call value objects; nothing outlives an operation.
//! - Results carry an ordered issue list that starts empty and is never null.

mod entry;
mod issue;

use std::path::PathBuf;

use vfxpipe_config::PipelineConfig;

pub use entry::{EntryKind, ListingEntry};
pub use issue::{IngestIssue, PathRole, render_issues};

use crate::version::VersionLabel;

/// Tunables and roots the engine is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Root holding `Templates/{department}` trees.
    pub template_root: PathBuf,
    /// Root under which project hierarchies live.
    pub project_root: PathBuf,
    /// Attempts made to reserve a fresh version directory.
    pub version_retry_limit: u32,
    /// Concurrent copy workers for sequence ingestion.
    pub copy_workers: usize,
}

impl EngineSettings {
    /// Extract the engine's share of the process configuration.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            template_root: config.template_root.clone(),
            project_root: config.project_root.clone(),
            version_retry_limit: config.version_retry_limit,
            copy_workers: config.copy_workers,
        }
    }
}

/// Request to provision a versioned department workspace from its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRequest {
    /// Project code.
    pub project: String,
    /// Sequence name.
    pub sequence: String,
    /// Shot name.
    pub shot: String,
    /// Department; also selects the template tree.
    pub department: String,
    /// Requesting user, recorded in logs only.
    pub user: String,
}

/// Outcome of a workspace provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceResult {
    /// `true` when the template tree was copied in full.
    pub success: bool,
    /// `{version dir}/{department}` once a version was reserved.
    pub destination: Option<PathBuf>,
    /// Template tree consulted for the department.
    pub template_used: PathBuf,
    /// Reserved version, if any.
    pub version: Option<VersionLabel>,
    /// Issues encountered, in the order they occurred.
    pub errors: Vec<IngestIssue>,
}

/// Whether an ingestion copies one file or a directory of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// `src_path` names a single file.
    Single,
    /// `src_path` names a directory whose matching members form one sequence.
    Sequence,
}

impl IngestMode {
    /// Map the wire `is_sequence` flag onto a mode.
    #[must_use]
    pub const fn from_flag(is_sequence: bool) -> Self {
        if is_sequence {
            Self::Sequence
        } else {
            Self::Single
        }
    }

    /// Kind of filesystem entry `src_path` must be.
    #[must_use]
    pub const fn expected_source(self) -> EntryKind {
        match self {
            Self::Single => EntryKind::File,
            Self::Sequence => EntryKind::Directory,
        }
    }

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Sequence => "sequence",
        }
    }
}

/// Request to ingest delivered media into the project tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionRequest {
    /// Project code.
    pub project: String,
    /// Sequence name.
    pub sequence: String,
    /// Shot name.
    pub shot: String,
    /// Department receiving the media.
    pub department: String,
    /// Asset type folder (wire name `type`).
    pub asset_type: String,
    /// Single file or sequence ingestion.
    pub mode: IngestMode,
    /// Delivered file or directory.
    pub src_path: PathBuf,
    /// Extension to match and write, with or without a leading dot.
    pub extension: String,
    /// Base name for the renamed output.
    pub naming_scheme: String,
    /// Embed the version label in output file names.
    pub versioning: bool,
    /// Requesting user, recorded in logs only.
    pub user: String,
}

/// Outcome of an ingestion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionResult {
    /// `true` only when every planned copy succeeded.
    pub success: bool,
    /// Written file (single mode) or version directory (sequence mode).
    pub destination_path: Option<PathBuf>,
    /// Source path as requested.
    pub source_path: PathBuf,
    /// Reserved version, if any.
    pub version: Option<VersionLabel>,
    /// Destination files that were written, in plan order.
    pub copied: Vec<PathBuf>,
    /// Issues encountered, in the order they occurred.
    pub errors: Vec<IngestIssue>,
}

impl IngestionResult {
    pub(crate) const fn failed(source_path: PathBuf, errors: Vec<IngestIssue>) -> Self {
        Self {
            success: false,
            destination_path: None,
            source_path,
            version: None,
            copied: Vec::new(),
            errors,
        }
    }
}

/// Request to list a directory with sequences compacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListingRequest {
    /// Base path; backslashes are treated as separators.
    pub search_path: String,
    /// Folder under `search_path` to list.
    pub folders_to_search: String,
    /// Optional extension filter, with or without a leading dot.
    pub extension: Option<String>,
}

/// Compacted directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Directory that was listed.
    pub search_path: PathBuf,
    /// Grouped sequences first, then standalone names.
    pub entries: Vec<ListingEntry>,
}
