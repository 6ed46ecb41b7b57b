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

//! Process configuration for the vfxpipe service.
//!
//! Layout: `model.rs` (typed configuration), `defaults.rs` (default values and
//! variable names), `loader.rs` (defaults, JSON file, environment overrides),
//! `validate.rs` (field validation helpers), `error.rs` (error type).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_from_env};
pub use model::{LogFormatSetting, PipelineConfig};
