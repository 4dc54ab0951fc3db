//! Configuration for canivete-api.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML or JSON file (`--config`)
//! 3. `CANIVETE_*` environment variables, plus `PORT`

use std::path::Path;
use std::time::Duration;

use canivete_server::ServerConfig;
use canivete_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Full application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaniveteConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Logging and metrics settings.
    pub telemetry: TelemetrySettings,
    /// Settings for the internet capability.
    pub internet: InternetSettings,
    #[serde(skip)]
    rejected_overrides: Vec<RejectedOverride>,
}

/// An environment override that could not be parsed and was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    /// Variable name.
    pub key: String,
    /// Raw value as found in the environment.
    pub value: String,
}

impl CaniveteConfig {
    /// Load configuration from a file, picking the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("failed to read {}: {e}", path.display())))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        Self::parse(&content, extension)
    }

    /// Parse configuration text in the given format (`toml` or `json`).
    pub fn parse(content: &str, format: &str) -> AppResult<Self> {
        match format {
            "toml" => {
                toml::from_str(content).map_err(|e| AppError::config(format!("invalid TOML: {e}")))
            }
            "json" => serde_json::from_str(content)
                .map_err(|e| AppError::config(format!("invalid JSON: {e}"))),
            other => Err(AppError::config(format!(
                "unsupported config format: {other:?}"
            ))),
        }
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    ///
    /// Values that fail to parse are ignored and kept in
    /// [`rejected_overrides`](Self::rejected_overrides).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut rejected = Vec::new();

        if let Some(port) = lookup("PORT") {
            set_parsed(&mut self.server.listen_port, "PORT", &port, &mut rejected, |v| {
                v.parse().ok()
            });
        }
        if let Some(port) = lookup("CANIVETE_LISTEN_PORT") {
            set_parsed(
                &mut self.server.listen_port,
                "CANIVETE_LISTEN_PORT",
                &port,
                &mut rejected,
                |v| v.parse().ok(),
            );
        }
        if let Some(addr) = lookup("CANIVETE_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Some(level) = lookup("CANIVETE_LOG_LEVEL") {
            self.telemetry.log_level = level;
        }
        if let Some(json) = lookup("CANIVETE_JSON_LOGS") {
            set_parsed(
                &mut self.telemetry.json_logs,
                "CANIVETE_JSON_LOGS",
                &json,
                &mut rejected,
                parse_bool,
            );
        }
        if let Some(metrics) = lookup("CANIVETE_METRICS") {
            set_parsed(
                &mut self.telemetry.metrics,
                "CANIVETE_METRICS",
                &metrics,
                &mut rejected,
                parse_bool,
            );
        }
        if let Some(url) = lookup("CANIVETE_MEDIUM_BASE_URL") {
            self.internet.medium_base_url = url;
        }
        if let Some(timeout) = lookup("CANIVETE_REQUEST_TIMEOUT") {
            set_parsed(
                &mut self.internet.request_timeout,
                "CANIVETE_REQUEST_TIMEOUT",
                &timeout,
                &mut rejected,
                |v| duration_serde::parse_duration(v).ok(),
            );
        }

        self.rejected_overrides.extend(rejected);
        self
    }

    /// Overrides ignored by [`with_overrides`](Self::with_overrides) because
    /// their values did not parse.
    pub fn rejected_overrides(&self) -> &[RejectedOverride] {
        &self.rejected_overrides
    }

    /// Logs every rejected override at `warn`.
    ///
    /// Overrides are applied before logging is installed, so this runs once
    /// telemetry is up.
    pub fn log_rejected_overrides(&self) {
        for rejected in &self.rejected_overrides {
            tracing::warn!(
                key = %rejected.key,
                value = %rejected.value,
                "ignoring unparsable environment override"
            );
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(AppError::config("server.listen_addr is required"));
        }
        if self.server.listen_port == 0 {
            return Err(AppError::config("server.listen_port must not be 0"));
        }
        if self.server.max_body_size == 0 {
            return Err(AppError::config("server.max_body_size must not be 0"));
        }

        let url = &self.internet.medium_base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::config(
                "internet.medium_base_url must start with http:// or https://",
            ));
        }

        Ok(())
    }

    /// Returns `listen_addr:listen_port`.
    #[must_use]
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.server.listen_addr, self.server.listen_port)
    }

    /// Server settings in the shape the HTTP server expects.
    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::builder()
            .http_addr(self.http_addr())
            .shutdown_timeout(self.server.shutdown_timeout)
            .http2_enabled(self.server.http2)
            .max_body_size(self.server.max_body_size)
            .service_name(self.telemetry.service_name.clone())
            .service_version(crate::VERSION)
            .build()
    }

    /// Telemetry settings in the shape the telemetry crate expects.
    #[must_use]
    pub fn telemetry_config(&self) -> TelemetryConfig {
        let logging = LogConfig {
            level: self.telemetry.log_level.clone(),
            json_format: self.telemetry.json_logs,
            ..LogConfig::production()
        };
        let metrics = MetricsConfig {
            enabled: self.telemetry.metrics,
            ..MetricsConfig::default()
        };

        TelemetryConfig::builder()
            .service_name(&self.telemetry.service_name)
            .logging(logging)
            .metrics(metrics)
            .build()
    }
}

fn set_parsed<T>(
    target: &mut T,
    key: &str,
    raw: &str,
    rejected: &mut Vec<RejectedOverride>,
    parse: impl Fn(&str) -> Option<T>,
) {
    match parse(raw.trim()) {
        Some(value) => *target = value,
        None => rejected.push(RejectedOverride {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to.
    pub listen_addr: String,
    /// Port to listen on.
    pub listen_port: u16,
    /// How long open connections get to finish on shutdown.
    #[serde(with = "duration_serde")]
    pub shutdown_timeout: Duration,
    /// Serve HTTP/2 alongside HTTP/1.1.
    pub http2: bool,
    /// Largest accepted request body, in bytes.
    pub max_body_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            shutdown_timeout: Duration::from_secs(30),
            http2: true,
            max_body_size: canivete_server::DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Telemetry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Service name for logs and `/health`.
    pub service_name: String,
    /// Log filter directive.
    pub log_level: String,
    /// Emit JSON logs instead of human-readable ones.
    pub json_logs: bool,
    /// Install the Prometheus recorder and serve `/metrics`.
    pub metrics: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: "canivete-api".to_string(),
            log_level: "info".to_string(),
            json_logs: true,
            metrics: true,
        }
    }
}

/// Settings for the Medium client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InternetSettings {
    /// Medium origin, without a trailing slash.
    pub medium_base_url: String,
    /// Timeout for one fetch.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for InternetSettings {
    fn default() -> Self {
        Self {
            medium_base_url: "https://medium.com".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Durations written as `"250ms"`, `"30s"`, `"5m"`, `"1h"` or bare seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis();
        if millis % 1000 == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{millis}ms"))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        let number = |digits: &str| -> Result<u64, String> {
            digits
                .trim()
                .parse()
                .map_err(|_| format!("invalid duration: {s:?}"))
        };

        if let Some(n) = s.strip_suffix("ms") {
            Ok(Duration::from_millis(number(n)?))
        } else if let Some(n) = s.strip_suffix('s') {
            Ok(Duration::from_secs(number(n)?))
        } else if let Some(n) = s.strip_suffix('m') {
            Ok(Duration::from_secs(number(n)? * 60))
        } else if let Some(n) = s.strip_suffix('h') {
            Ok(Duration::from_secs(number(n)? * 3600))
        } else {
            Ok(Duration::from_secs(number(s)?))
        }
    }
}
