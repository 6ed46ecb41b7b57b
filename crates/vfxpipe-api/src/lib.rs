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

//! HTTP surface for the vfxpipe versioning and ingestion engine.
//!
//! # Design
//! - Handlers decode and validate wire DTOs, then hand engine requests to
//!   [`vfxpipe_fsops::FsOpsService`] on the blocking pool.
//! - Request-format failures are rejected with `400` before the engine runs.
//! - Per-request engine problems travel inside `200` result bodies; only fatal
//!   engine errors become `500` problem documents.

pub mod error;
pub mod http;
mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
