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

//! Shared test helpers used across the vfxpipe crates.
//! Layout: fixtures.rs (temporary pipeline trees, frame files, templates).

pub mod fixtures;

pub use fixtures::{PipelineTree, temp_dir, write_file, write_frames};
