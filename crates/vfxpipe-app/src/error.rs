//! Start-up failures of the `vfxpipe-server` binary, tagged with the step that failed.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Start-up and serving failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// `VFXPIPE_*` settings were missing or malformed.
    #[error("{operation}: pipeline configuration rejected")]
    Config {
        /// Bootstrap step, e.g. `config.load`.
        operation: &'static str,
        /// Loader error.
        source: vfxpipe_config::ConfigError,
    },
    /// The subscriber or metrics registry could not be set up.
    #[error("{operation}: logging or metrics unavailable")]
    Telemetry {
        /// Bootstrap step, e.g. `config.load`.
        operation: &'static str,
        /// Telemetry error.
        source: vfxpipe_telemetry::TelemetryError,
    },
    /// The engine could not be constructed.
    #[error("{operation}: ingestion engine could not start")]
    FsOps {
        /// Bootstrap step, e.g. `config.load`.
        operation: &'static str,
        /// Engine error.
        source: vfxpipe_fsops::FsOpsError,
    },
    /// Binding or serving HTTP failed.
    #[error("{operation}: http listener failed")]
    ApiServer {
        /// Bootstrap step, e.g. `config.load`.
        operation: &'static str,
        /// Listener error.
        source: vfxpipe_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: vfxpipe_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: vfxpipe_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn fsops(operation: &'static str, source: vfxpipe_fsops::FsOpsError) -> Self {
        Self::FsOps { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: vfxpipe_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}
