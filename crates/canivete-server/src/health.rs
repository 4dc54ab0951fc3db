//! Liveness and readiness.
//!
//! - `GET /health` is always 200 while the process serves requests.
//! - `GET /ready` is 200 until shutdown starts, then 503 so load balancers
//!   stop routing new traffic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Always `"healthy"` while serving.
    pub status: String,

    /// Service name.
    pub service: String,

    /// Service version.
    pub version: String,

    /// Seconds since the server was built.
    pub uptime_seconds: u64,
}

/// Liveness check.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    start_time: Instant,
}

impl HealthCheck {
    /// Creates a health check reporting `service` and `version`.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            start_time: Instant::now(),
        }
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            service: self.service.clone(),
            version: self.version.clone(),
            uptime_seconds: self.uptime().as_secs(),
        }
    }

    /// Returns the time since creation.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Body of `GET /ready`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessStatus {
    /// Whether new traffic is accepted.
    pub ready: bool,
}

/// Readiness check, flipped off when shutdown begins.
#[derive(Debug, Clone)]
pub struct ReadinessCheck {
    ready: Arc<AtomicBool>,
}

impl ReadinessCheck {
    /// Creates a readiness check that starts ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Sets readiness.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Returns `true` while ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: self.is_ready(),
        }
    }
}

impl Default for ReadinessCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status() {
        let health = HealthCheck::new("canivete-api", "0.1.0");
        let status = health.status();

        assert_eq!(status.status, "healthy");
        assert_eq!(status.service, "canivete-api");
        assert_eq!(status.version, "0.1.0");
    }

    #[test]
    fn test_health_status_json() {
        let status = HealthCheck::new("svc", "1.2.3").status();
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "svc");
        assert!(json["uptime_seconds"].is_u64());
    }

    #[test]
    fn test_readiness_toggle_is_shared() {
        let readiness = ReadinessCheck::new();
        let clone = readiness.clone();
        assert!(readiness.is_ready());

        clone.set_ready(false);
        assert!(!readiness.is_ready());
        assert_eq!(readiness.status(), ReadinessStatus { ready: false });
    }
}
