//! Telemetry configuration.

use crate::error::TelemetryError;
use crate::logging::LogConfig;
use crate::metrics::MetricsConfig;
use crate::TelemetryResult;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name (used in logs).
    pub service_name: String,

    /// Metrics configuration.
    pub metrics: MetricsConfig,

    /// Logging configuration.
    pub logging: LogConfig,
}

impl TelemetryConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::new()
    }

    /// Rejects settings that would fail at install time.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` if metrics are enabled without
    /// duration buckets, or if the buckets are not strictly increasing.
    pub fn validate(&self) -> TelemetryResult<()> {
        if !self.metrics.enabled {
            return Ok(());
        }
        let buckets = &self.metrics.duration_buckets;
        if buckets.is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "duration buckets cannot be empty".to_string(),
            ));
        }
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TelemetryError::InvalidConfig(
                "duration buckets must be strictly increasing".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "canivete-api".to_string(),
            metrics: MetricsConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Builder for [`TelemetryConfig`].
#[derive(Debug, Default)]
pub struct TelemetryConfigBuilder {
    service_name: Option<String>,
    metrics: Option<MetricsConfig>,
    logging: Option<LogConfig>,
}

impl TelemetryConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: &str) -> Self {
        self.service_name = Some(name.to_string());
        self
    }

    /// Sets the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, config: MetricsConfig) -> Self {
        self.metrics = Some(config);
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn logging(mut self, config: LogConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Sets the log filter directive.
    #[must_use]
    pub fn log_level(mut self, level: &str) -> Self {
        let config = self.logging.take().unwrap_or_default();
        self.logging = Some(LogConfig {
            level: level.to_string(),
            ..config
        });
        self
    }

    /// Disables the Prometheus recorder.
    #[must_use]
    pub fn without_metrics(mut self) -> Self {
        let config = self.metrics.take().unwrap_or_default();
        self.metrics = Some(MetricsConfig {
            enabled: false,
            ..config
        });
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let defaults = TelemetryConfig::default();

        let service_name = self.service_name.unwrap_or(defaults.service_name);
        let metrics = self.metrics.unwrap_or(defaults.metrics);

        let mut logging = self.logging.unwrap_or(defaults.logging);
        logging.service_name = service_name.clone();

        TelemetryConfig {
            service_name,
            metrics,
            logging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "canivete-api");
        assert!(config.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_propagates_service_name() {
        let config = TelemetryConfig::builder().service_name("gateway").build();

        assert_eq!(config.service_name, "gateway");
        assert_eq!(config.logging.service_name, "gateway");
    }

    #[test]
    fn test_builder_log_level() {
        let config = TelemetryConfig::builder().log_level("warn").build();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_builder_without_metrics() {
        let config = TelemetryConfig::builder().without_metrics().build();
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_validate_rejects_bad_buckets() {
        let mut config = TelemetryConfig::default();
        config.metrics.duration_buckets = vec![];
        assert!(matches!(
            config.validate(),
            Err(TelemetryError::InvalidConfig(_))
        ));

        config.metrics.duration_buckets = vec![0.5, 0.1];
        assert!(config.validate().is_err());

        config.metrics.enabled = false;
        assert!(config.validate().is_ok());
    }
}
