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
#![allow(clippy::module_name_repetitions)]

//! Versioning and ingestion engine for VFX project trees.
//!
//! Layout: `paths.rs` (segment validation and joining), `version.rs` (next
//! version resolution and atomic reservation), `sequence.rs` (frame sequence
//! detection), `transfer.rs` (file, tree, and batch copies), `service.rs`
//! (`FsOpsService` operations), `model/` (requests, results, issues),
//! `error.rs` (error type).

pub mod error;
pub mod model;
pub mod paths;
pub mod sequence;
pub mod service;
pub mod transfer;
pub mod version;

pub use error::{FsOpsError, FsOpsResult};
pub use model::{
    DirectoryListing, DirectoryListingRequest, EngineSettings, EntryKind, IngestIssue, IngestMode,
    IngestionRequest, IngestionResult, ListingEntry, PathRole, WorkspaceRequest, WorkspaceResult,
    render_issues,
};
pub use paths::build_path;
pub use sequence::SequenceDetector;
pub use service::FsOpsService;
pub use version::{Reservation, VersionLabel, VersionResolver, VersionedPath};
