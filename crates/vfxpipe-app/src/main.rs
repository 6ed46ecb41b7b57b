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

//! Binary entrypoint for the vfxpipe ingestion service.

use vfxpipe_app::{AppResult, run_app};

/// Boots the service and blocks until the listener stops.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app().await
}
