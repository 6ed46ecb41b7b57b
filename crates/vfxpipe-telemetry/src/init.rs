//! Global subscriber installation.
//!
//! `RUST_LOG` wins over the configured level when it parses. The build
//! identifier handed to [`init_logging`] is kept for the life of the process
//! and stamped onto the application span and `/health`.

use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Level used when neither `RUST_LOG` nor `VFXPIPE_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const UNKNOWN_BUILD: &str = "dev";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Inputs for [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Filter directive such as `info` or `vfxpipe_fsops=debug`.
    pub level: &'a str,
    /// Line format.
    pub format: LogFormat,
    /// Build identifier reported by [`build_sha`].
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: UNKNOWN_BUILD,
        }
    }
}

/// Line format written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty for debug builds, JSON for release builds.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Resolve a configured name, falling back to [`LogFormat::infer`].
    #[must_use]
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(name) if name.eq_ignore_ascii_case("json") => Self::Json,
            Some(name) if name.eq_ignore_ascii_case("pretty") => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

/// Install the process-wide tracing subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::SubscriberInstall`] when a global subscriber is
/// already in place.
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    BUILD_SHA.get_or_init(|| config.build_sha.to_owned());

    let (json, pretty) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json().with_target(false)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(false))),
    };

    tracing_subscriber::registry()
        .with(level_filter(config.level))
        .with(json)
        .with(pretty)
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Build identifier recorded by [`init_logging`], or `dev` before it runs.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or(UNKNOWN_BUILD, String::as_str)
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(LogFormat::from_setting(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::from_setting(Some(" pretty ")), LogFormat::Pretty);
        assert_eq!(LogFormat::from_setting(Some("yaml")), LogFormat::infer());
        assert_eq!(LogFormat::from_setting(None), LogFormat::infer());
    }

    #[test]
    fn second_install_is_rejected() {
        let config = LoggingConfig {
            format: LogFormat::Json,
            build_sha: "abc123",
            ..LoggingConfig::default()
        };
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::SubscriberInstall { .. })
        ));
        assert_ne!(build_sha(), "");
    }
}
