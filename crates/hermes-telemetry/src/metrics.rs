//! Prometheus metrics for interceptor events.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_recovered_panics_total` | Counter | `procedure` | Panics converted to internal errors |
//! | `hermes_validation_failures_total` | Counter | `procedure` | Requests rejected by validation |
//! | `hermes_slowdown_delays_total` | Counter | `procedure` | Responses delayed by the slowdown interceptor |
//!
//! Recording before [`init_metrics`] is a no-op.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Counter of recovered panics.
pub const RECOVERED_PANICS_TOTAL: &str = "hermes_recovered_panics_total";

/// Counter of validation rejections.
pub const VALIDATION_FAILURES_TOTAL: &str = "hermes_validation_failures_total";

/// Counter of applied slowdown delays.
pub const SLOWDOWN_DELAYS_TOTAL: &str = "hermes_slowdown_delays_total";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Labels added to every metric (e.g. `service`).
    pub global_labels: Vec<(String, String)>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global_labels: Vec::new(),
        }
    }
}

/// Renders collected metrics in Prometheus text format.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Creates a registry over an installed recorder's handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Returns the registry for the global recorder, if [`init_metrics`] ran.
    #[must_use]
    pub fn global() -> Option<Self> {
        METRICS_HANDLE.get().cloned().map(Self::new)
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder.
///
/// Exposing the rendered text over HTTP is left to the host server, which
/// can serve [`MetricsRegistry::render`] from its own endpoint.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a global recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = config
        .global_labels
        .iter()
        .fold(PrometheusBuilder::new(), |builder, (key, value)| {
            builder.add_global_label(key, value)
        });

    let handle = builder
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    describe_metrics();

    Ok(())
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for all interceptor metrics.
pub fn describe_metrics() {
    describe_counter!(
        RECOVERED_PANICS_TOTAL,
        "Total panics recovered and converted to internal errors"
    );
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Total requests rejected by request validation"
    );
    describe_counter!(
        SLOWDOWN_DELAYS_TOTAL,
        "Total responses delayed by the slowdown interceptor"
    );
}

/// Records a recovered panic for `procedure`.
pub fn record_recovered_panic(procedure: &str) {
    counter!(RECOVERED_PANICS_TOTAL, "procedure" => procedure.to_string()).increment(1);
}

/// Records a validation rejection for `procedure`.
pub fn record_validation_failure(procedure: &str) {
    counter!(VALIDATION_FAILURES_TOTAL, "procedure" => procedure.to_string()).increment(1);
}

/// Records an applied slowdown delay for `procedure`.
pub fn record_slowdown(procedure: &str) {
    counter!(SLOWDOWN_DELAYS_TOTAL, "procedure" => procedure.to_string()).increment(1);
}
