//! Failures raised while wiring logging or the metrics registry.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::string::FromUtf8Error;

use prometheus::Error as PrometheusError;
use tracing_subscriber::util::TryInitError;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Step of collector setup that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStage {
    /// The collector could not be constructed from its options.
    Build,
    /// The registry rejected the collector, usually a duplicate name.
    Register,
}

impl CollectorStage {
    const fn verb(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Register => "register",
        }
    }
}

/// Errors raised by telemetry helpers.
#[derive(Debug)]
pub enum TelemetryError {
    /// A global tracing subscriber was already installed.
    SubscriberInstall {
        /// Error reported by `tracing-subscriber`.
        source: TryInitError,
    },
    /// A counter could not be built or added to the registry.
    Collector {
        /// Metric name, e.g. `fsops_files_copied_total`.
        metric: &'static str,
        /// Setup step that failed.
        stage: CollectorStage,
        /// Error reported by `prometheus`.
        source: PrometheusError,
    },
    /// The text exposition could not be produced.
    Exposition {
        /// Error reported by the text encoder.
        source: PrometheusError,
    },
    /// The encoder produced bytes that are not UTF-8.
    ExpositionUtf8 {
        /// Conversion failure.
        source: FromUtf8Error,
    },
}

impl TelemetryError {
    pub(crate) const fn collector(
        metric: &'static str,
        stage: CollectorStage,
        source: PrometheusError,
    ) -> Self {
        Self::Collector {
            metric,
            stage,
            source,
        }
    }
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscriberInstall { .. } => {
                formatter.write_str("a tracing subscriber is already installed")
            }
            Self::Collector { metric, stage, .. } => {
                write!(formatter, "could not {} metric `{metric}`", stage.verb())
            }
            Self::Exposition { .. } => formatter.write_str("could not encode /metrics output"),
            Self::ExpositionUtf8 { .. } => {
                formatter.write_str("/metrics output contained invalid utf-8")
            }
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubscriberInstall { source } => Some(source),
            Self::Collector { source, .. } | Self::Exposition { source } => Some(source),
            Self::ExpositionUtf8 { source } => Some(source),
        }
    }
}
