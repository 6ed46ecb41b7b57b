//! Typed configuration model.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_COPY_WORKERS, DEFAULT_HTTP_PORT, DEFAULT_LOG_LEVEL, DEFAULT_VERSION_RETRY_LIMIT,
};

/// Effective configuration for the service and the ingestion engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Root holding the `Templates/{department}` trees.
    pub template_root: PathBuf,
    /// Root under which project hierarchies are provisioned and ingested.
    pub project_root: PathBuf,
    /// Address the HTTP listener binds to.
    pub bind_addr: IpAddr,
    /// Port the HTTP listener binds to.
    pub http_port: u16,
    /// Log level passed to the tracing filter.
    pub log_level: String,
    /// Log output format; inferred from the build profile when unset.
    pub log_format: Option<LogFormatSetting>,
    /// Attempts made to reserve a fresh version directory.
    pub version_retry_limit: u32,
    /// Concurrent copy workers for sequence ingestion.
    pub copy_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            template_root: PathBuf::new(),
            project_root: PathBuf::new(),
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: DEFAULT_HTTP_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: None,
            version_retry_limit: DEFAULT_VERSION_RETRY_LIMIT,
            copy_workers: DEFAULT_COPY_WORKERS,
        }
    }
}

impl PipelineConfig {
    /// Socket address for the HTTP listener.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }

    /// Log format name understood by the telemetry crate, if one was configured.
    #[must_use]
    pub fn log_format_name(&self) -> Option<&'static str> {
        self.log_format.map(LogFormatSetting::as_str)
    }
}

/// Configured log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

impl LogFormatSetting {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}
