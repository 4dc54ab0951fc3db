//! Observability for the canivete gateway.
//!
//! - **Metrics**: Prometheus text exposition via the `metrics` facade
//! - **Logging**: structured JSON (or pretty) logs via `tracing-subscriber`
//!
//! # Example
//!
//! ```rust,ignore
//! use canivete_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("canivete-api")
//!     .build();
//!
//! let registry = init_telemetry(&config)?;
//! // hand `registry` to the server so it can serve /metrics
//! ```
//!
//! # Metrics Endpoint
//!
//! ```text
//! # TYPE canivete_requests_total counter
//! canivete_requests_total{operation="fromunix",status="200"} 12
//! canivete_requests_total{operation="calculate-compound-interests",status="400"} 3
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{
    init_metrics, record_request, record_request_size, record_validation_failure, InFlightGuard,
    MetricsConfig, MetricsRegistry,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging and metrics.
///
/// Returns the metrics registry when metrics are enabled.
///
/// # Errors
///
/// Returns `TelemetryError` if the configuration is invalid or any subsystem
/// fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    config.validate()?;

    init_logging(&config.logging)?;
    let registry = init_metrics(&config.metrics)?;

    ::tracing::info!(
        service = %config.service_name,
        metrics = registry.is_some(),
        "telemetry initialized"
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_everything_disabled() {
        let mut config = TelemetryConfig::builder().without_metrics().build();
        config.logging.enabled = false;

        let registry = init_telemetry(&config).unwrap();
        assert!(registry.is_none());
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let mut config = TelemetryConfig::default();
        config.metrics.duration_buckets.clear();
        assert!(init_telemetry(&config).is_err());
    }
}
