//! Prometheus metrics for canivete.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `canivete_requests_total` | Counter | `operation`, `status` | Total requests |
//! | `canivete_request_duration_seconds` | Histogram | `operation` | Request latency |
//! | `canivete_in_flight_requests` | Gauge | - | In-flight requests |
//! | `canivete_request_size_bytes` | Histogram | `operation` | Request body size |
//! | `canivete_validation_failures_total` | Counter | `operation`, `rule` | Rejected request shapes |
//!
//! The recording functions go through the `metrics` facade, so they are
//! no-ops until [`init_metrics`] installs a recorder.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

const REQUESTS_TOTAL: &str = "canivete_requests_total";
const REQUEST_DURATION: &str = "canivete_request_duration_seconds";
const IN_FLIGHT: &str = "canivete_in_flight_requests";
const REQUEST_SIZE: &str = "canivete_request_size_bytes";
const VALIDATION_FAILURES: &str = "canivete_validation_failures_total";

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for request duration.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Handle to the installed Prometheus recorder.
///
/// The server holds one of these to serve `/metrics`; nothing global is kept.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps an existing handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.run_upkeep();
        self.handle.render()
    }
}

/// Installs the Prometheus recorder.
///
/// Returns `None` when metrics are disabled.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if the buckets are invalid or a
/// recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    register_metric_descriptions();

    Ok(Some(MetricsRegistry::new(handle)))
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests processed");
    describe_histogram!(REQUEST_DURATION, "HTTP request duration in seconds");
    describe_gauge!(IN_FLIGHT, "Number of HTTP requests currently being processed");
    describe_histogram!(REQUEST_SIZE, "HTTP request body size in bytes");
    describe_counter!(
        VALIDATION_FAILURES,
        "Requests rejected by a validation rule"
    );
}

/// Records a completed request.
pub fn record_request(operation: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION, "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

/// Records request body size.
pub fn record_request_size(operation: &str, size_bytes: usize) {
    histogram!(REQUEST_SIZE, "operation" => operation.to_string()).record(size_bytes as f64);
}

/// Records a request rejected by a validation rule.
pub fn record_validation_failure(operation: &str, rule: &str) {
    counter!(
        VALIDATION_FAILURES,
        "operation" => operation.to_string(),
        "rule" => rule.to_string()
    )
    .increment(1);
}

/// Guard that keeps the in-flight gauge raised while alive.
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.duration_buckets.len(), 12);
    }

    #[test]
    fn test_disabled_metrics_installs_nothing() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(init_metrics(&config).unwrap().is_none());
    }

    #[test]
    fn test_record_functions_dont_panic_without_recorder() {
        record_request("fromunix", 200, Duration::from_millis(10));
        record_request_size("fromunix", 11);
        record_validation_failure("calculate-compound-interests", "required");
        drop(InFlightGuard::new());
    }

    #[test]
    fn test_recorded_request_is_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let registry = MetricsRegistry::new(recorder.handle());

        metrics::with_local_recorder(&recorder, || {
            record_request("uuid", 200, Duration::from_millis(3));
            record_validation_failure("calculate-compound-interests", "gt");
        });

        let output = registry.render();
        assert!(output.contains("canivete_requests_total"));
        assert!(output.contains("operation=\"uuid\""));
        assert!(output.contains("rule=\"gt\""));
    }
}
