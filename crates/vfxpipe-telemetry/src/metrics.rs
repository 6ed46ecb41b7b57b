//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Collector registration stays private; callers only see typed increment helpers.
//! - Counters cover HTTP traffic, engine operations, copied files, and version collisions.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{CollectorStage, Result, TelemetryError};

/// Prometheus-backed metrics registry shared across the engine and HTTP surface.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    fsops_operations_total: IntCounterVec,
    files_copied_total: IntCounter,
    version_collisions_total: IntCounter,
}

/// Point-in-time view of the engine counters, surfaced by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Files copied into versioned destinations since start-up.
    pub files_copied_total: u64,
    /// Version reservations that lost a race and had to be re-resolved.
    pub version_collisions_total: u64,
}

impl Metrics {
    /// Construct a registry with every vfxpipe collector registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let fsops_operations_total = counter_vec(
            "fsops_operations_total",
            "Workspace, listing, and ingest operations by outcome",
            &["operation", "outcome"],
        )?;
        let files_copied_total = counter(
            "fsops_files_copied_total",
            "Files copied into versioned destinations",
        )?;
        let version_collisions_total = counter(
            "fsops_version_collisions_total",
            "Version directory reservations that collided with a concurrent writer",
        )?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "fsops_operations_total", &fsops_operations_total)?;
        register(&registry, "fsops_files_copied_total", &files_copied_total)?;
        register(
            &registry,
            "fsops_version_collisions_total",
            &version_collisions_total,
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                fsops_operations_total,
                files_copied_total,
                version_collisions_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the engine operation counter, e.g. `("ingest", "partial")`.
    pub fn inc_fsops_operation(&self, operation: &str, outcome: &str) {
        self.inner
            .fsops_operations_total
            .with_label_values(&[operation, outcome])
            .inc();
    }

    /// Add to the copied-files counter.
    pub fn add_files_copied(&self, count: u64) {
        self.inner.files_copied_total.inc_by(count);
    }

    /// Record a version reservation collision.
    pub fn inc_version_collision(&self) {
        self.inner.version_collisions_total.inc();
    }

    /// Render the registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or the encoded buffer
    /// is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|source| TelemetryError::Exposition { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::ExpositionUtf8 { source })
    }

    /// Take a point-in-time snapshot of the engine counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_copied_total: self.inner.files_copied_total.get(),
            version_collisions_total: self.inner.version_collisions_total.get(),
        }
    }
}

fn counter(name: &'static str, help: &str) -> Result<IntCounter> {
    IntCounter::with_opts(Opts::new(name, help))
        .map_err(|source| TelemetryError::collector(name, CollectorStage::Build, source))
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::collector(name, CollectorStage::Build, source))
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::collector(name, CollectorStage::Register, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_engine_counters() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.add_files_copied(3);
        metrics.add_files_copied(2);
        metrics.inc_version_collision();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_copied_total, 5);
        assert_eq!(snapshot.version_collisions_total, 1);
        Ok(())
    }

    #[test]
    fn render_includes_labelled_counters() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_http_request("/ingest_request", 200);
        metrics.inc_fsops_operation("ingest", "success");
        metrics.add_files_copied(1);

        let rendered = metrics.render()?;
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("route=\"/ingest_request\""));
        assert!(rendered.contains("fsops_operations_total"));
        assert!(rendered.contains("outcome=\"success\""));
        assert!(rendered.contains("fsops_files_copied_total 1"));
        Ok(())
    }

    #[test]
    fn clones_share_one_registry() -> Result<()> {
        let metrics = Metrics::new()?;
        let clone = metrics.clone();
        clone.inc_version_collision();
        assert_eq!(metrics.snapshot().version_collisions_total, 1);
        Ok(())
    }

    #[test]
    fn snapshot_serializes_counter_names() -> std::result::Result<(), serde_json::Error> {
        let snapshot = MetricsSnapshot {
            files_copied_total: 7,
            version_collisions_total: 0,
        };
        let value = serde_json::to_value(&snapshot)?;
        assert_eq!(value["files_copied_total"], 7);
        assert_eq!(value["version_collisions_total"], 0);
        Ok(())
    }
}
