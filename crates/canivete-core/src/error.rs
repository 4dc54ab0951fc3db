//! Error types for canivete.
//!
//! Every failure a request can hit is resolved into one [`GatewayError`] at the
//! dispatcher boundary. A `GatewayError` knows its [`ErrorCategory`], the
//! category knows its HTTP status, and the error flattens into an [`ApiError`]
//! envelope for the client.
//!
//! | `ErrorCategory` | Status |
//! |---|---|
//! | `BodyRead` | 500 |
//! | `MissingBody` | 400 |
//! | `Format` | 400 |
//! | `Validation` | 400 |
//! | `InvalidInput` | 400 |
//! | `Service` | 500 |
//! | `PayloadTooLarge` | 413 |
//! | `NotFound` | 404 |
//! | `MethodNotAllowed` | 405 |

use crate::contract::ServiceError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used whenever a required body is absent.
pub(crate) const MISSING_BODY_MESSAGE: &str = "request body is invalid";

/// Result type alias using [`GatewayError`].
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Categories of errors for classification and status selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request body could not be read from the transport.
    BodyRead,
    /// The request carries no body where one is required.
    MissingBody,
    /// The body is present but cannot be decoded into the request shape.
    Format,
    /// The decoded request violates a declared rule.
    Validation,
    /// A service rejected input it understands (malformed token, out-of-range value).
    InvalidInput,
    /// A service failed after being invoked with valid input.
    Service,
    /// The body exceeds the configured size limit.
    PayloadTooLarge,
    /// No route matches the path.
    NotFound,
    /// The path exists but not for this method.
    MethodNotAllowed,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::BodyRead | Self::Service => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingBody | Self::Format | Self::Validation | Self::InvalidInput => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

/// Standard error type for the gateway.
///
/// The `Display` output of every variant is the bare message, which is
/// exactly what ends up in the envelope.
///
/// # Example
///
/// ```
/// use canivete_core::{GatewayError, ErrorCategory};
/// use http::StatusCode;
///
/// let err = GatewayError::format("unix timestamp must be an integer number");
/// assert_eq!(err.category(), ErrorCategory::Format);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), "unix timestamp must be an integer number");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Reading the body failed.
    #[error("{message}")]
    BodyRead {
        /// Human-readable error message.
        message: String,
    },

    /// Required body is absent.
    #[error("{message}")]
    MissingBody {
        /// Human-readable error message.
        message: String,
    },

    /// Body could not be decoded.
    #[error("{message}")]
    Format {
        /// Human-readable error message.
        message: String,
    },

    /// Decoded body violates a rule.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Service rejected the input.
    #[error("{message}")]
    InvalidInput {
        /// Human-readable error message.
        message: String,
    },

    /// Service failed.
    #[error("{message}")]
    Service {
        /// Human-readable error message.
        message: String,
    },

    /// Body exceeds the size limit.
    #[error("{message}")]
    PayloadTooLarge {
        /// Human-readable error message.
        message: String,
    },

    /// No such route.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Route exists for other methods.
    #[error("{message}")]
    MethodNotAllowed {
        /// Human-readable error message.
        message: String,
    },
}

impl GatewayError {
    /// Creates a body read error.
    #[must_use]
    pub fn body_read(message: impl Into<String>) -> Self {
        Self::BodyRead {
            message: message.into(),
        }
    }

    /// Creates the missing body error.
    #[must_use]
    pub fn missing_body() -> Self {
        Self::MissingBody {
            message: MISSING_BODY_MESSAGE.to_string(),
        }
    }

    /// Creates a format error.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a service error.
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Creates a payload too large error.
    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge {
            message: format!("request body exceeds the limit of {limit} bytes"),
        }
    }

    /// Creates a not found error for a path.
    #[must_use]
    pub fn not_found(path: &str) -> Self {
        Self::NotFound {
            message: format!("no route for {path}"),
        }
    }

    /// Creates a method not allowed error.
    #[must_use]
    pub fn method_not_allowed(method: &http::Method, path: &str) -> Self {
        Self::MethodNotAllowed {
            message: format!("method {method} is not allowed for {path}"),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::BodyRead { .. } => ErrorCategory::BodyRead,
            Self::MissingBody { .. } => ErrorCategory::MissingBody,
            Self::Format { .. } => ErrorCategory::Format,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::InvalidInput { .. } => ErrorCategory::InvalidInput,
            Self::Service { .. } => ErrorCategory::Service,
            Self::PayloadTooLarge { .. } => ErrorCategory::PayloadTooLarge,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns the message carried by this error.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BodyRead { message }
            | Self::MissingBody { message }
            | Self::Format { message }
            | Self::Validation { message }
            | Self::InvalidInput { message }
            | Self::Service { message }
            | Self::PayloadTooLarge { message }
            | Self::NotFound { message }
            | Self::MethodNotAllowed { message } => message,
        }
    }

    fn message_mut(&mut self) -> &mut String {
        match self {
            Self::BodyRead { message }
            | Self::MissingBody { message }
            | Self::Format { message }
            | Self::Validation { message }
            | Self::InvalidInput { message }
            | Self::Service { message }
            | Self::PayloadTooLarge { message }
            | Self::NotFound { message }
            | Self::MethodNotAllowed { message } => message,
        }
    }

    /// Prefixes the message, keeping the category.
    ///
    /// ```
    /// use canivete_core::GatewayError;
    ///
    /// let err = GatewayError::service("division by zero")
    ///     .context("unexpected error calculating interests");
    /// assert_eq!(err.to_string(), "unexpected error calculating interests: division by zero");
    /// ```
    #[must_use]
    pub fn context(mut self, prefix: &str) -> Self {
        let message = self.message_mut();
        *message = format!("{prefix}: {message}");
        self
    }

    /// Converts this error to the serializable client envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ApiError {
        ApiError::new(self.message())
    }

    /// Returns `true` for 5xx errors.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<ServiceError> for GatewayError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => Self::InvalidInput { message },
            ServiceError::Failed(message) => Self::Service { message },
        }
    }
}

/// The failure body sent to clients: `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Flattened, client-safe message.
    pub message: String,
}

impl ApiError {
    /// Creates an envelope from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_body_error() {
        let error = GatewayError::missing_body();
        assert_eq!(error.category(), ErrorCategory::MissingBody);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "request body is invalid");
    }

    #[test]
    fn test_body_read_is_server_error() {
        let error = GatewayError::body_read("error reading the body");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.is_server_error());
    }

    #[test]
    fn test_context_keeps_category() {
        let error = GatewayError::format("EOF while parsing a value at line 1 column 0")
            .context("request body is invalid");
        assert_eq!(error.category(), ErrorCategory::Format);
        assert_eq!(
            error.message(),
            "request body is invalid: EOF while parsing a value at line 1 column 0"
        );
    }

    #[test]
    fn test_service_error_mapping() {
        let invalid: GatewayError = ServiceError::InvalidInput("token is malformed".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.message(), "token is malformed");

        let failed: GatewayError = ServiceError::Failed("upstream down".into()).into();
        assert_eq!(failed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.message(), "upstream down");
    }

    #[test]
    fn test_envelope_serialization() {
        let error = GatewayError::validation("Key: 'X.y' Error:Field validation for 'y' failed on the 'required' tag");
        let json = serde_json::to_value(error.to_envelope()).expect("serialization should work");

        let object = json.as_object().expect("envelope is an object");
        assert_eq!(object.len(), 1);
        assert_eq!(
            object["message"],
            "Key: 'X.y' Error:Field validation for 'y' failed on the 'required' tag"
        );
    }

    #[test]
    fn test_payload_too_large() {
        let error = GatewayError::payload_too_large(1024);
        assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(error.message().contains("1024"));
    }

    #[test]
    fn test_all_error_categories_have_status_codes() {
        let categories = [
            ErrorCategory::BodyRead,
            ErrorCategory::MissingBody,
            ErrorCategory::Format,
            ErrorCategory::Validation,
            ErrorCategory::InvalidInput,
            ErrorCategory::Service,
            ErrorCategory::PayloadTooLarge,
            ErrorCategory::NotFound,
            ErrorCategory::MethodNotAllowed,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }
}
