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

//! Telemetry primitives shared across the vfxpipe workspace.
//!
//! This crate centralises logging, metrics, and request-tracing helpers so the
//! engine, the HTTP surface, and the binaries adopt a consistent observability story.
//!
//! Layout: `init.rs` (subscriber setup), `context.rs` (span/request context),
//! `layers.rs` (request-id middleware), `metrics.rs` (Prometheus registry),
//! `error.rs` (error type).

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::{GlobalContextGuard, current_request_id, current_route, with_request_context};
pub use error::{CollectorStage, Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{REQUEST_ID_HEADER, propagate_request_id_layer, set_request_id_layer};
pub use metrics::{Metrics, MetricsSnapshot};
