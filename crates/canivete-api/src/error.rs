//! Error types for the canivete-api binary.

use thiserror::Error;

/// Startup and wiring failures.
///
/// Request-time failures never surface here; they are turned into
/// `{"message": ...}` responses by the dispatch pipeline.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] canivete_telemetry::TelemetryError),

    /// The route table is inconsistent.
    #[error(transparent)]
    Router(#[from] canivete_server::RouterError),

    /// The HTTP server failed.
    #[error(transparent)]
    Server(#[from] canivete_server::ServerError),

    /// A service client could not be built.
    #[error("service setup error: {message}")]
    Service {
        /// Error message.
        message: String,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a service setup error.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }
}

/// Result type for startup operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::config("listen_port must not be 0");
        assert_eq!(err.to_string(), "configuration error: listen_port must not be 0");

        let err = AppError::service("tls backend unavailable");
        assert!(err.to_string().starts_with("service setup error"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "canivete.toml");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
