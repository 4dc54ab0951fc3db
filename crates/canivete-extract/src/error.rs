//! Extraction error types.
//!
//! An [`ExtractionError`] keeps the underlying parser or transport message
//! apart from its own display text, so callers can surface the raw detail
//! (for example serde's `EOF while parsing a value at line 1 column 0`).

use canivete_core::GatewayError;
use std::fmt;

/// Error that occurs while reading or decoding a request body.
///
/// # Example
///
/// ```rust
/// use canivete_extract::ExtractionError;
///
/// let err = ExtractionError::deserialization_failed("expected value at line 1 column 1");
/// assert_eq!(err.detail(), "expected value at line 1 column 1");
/// assert!(err.to_string().starts_with("failed to deserialize body"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    kind: ExtractionErrorKind,
    message: String,
    detail: String,
}

/// What went wrong during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    /// The request has no body.
    Missing,
    /// The body stream failed.
    ReadFailed,
    /// The body is not valid UTF-8.
    InvalidUtf8,
    /// The body text does not parse into the scalar type.
    ParseFailed,
    /// The body does not deserialize into the structured type.
    DeserializationFailed,
    /// The body exceeds the size limit.
    PayloadTooLarge,
}

impl ExtractionError {
    /// Creates an error for an absent body.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            kind: ExtractionErrorKind::Missing,
            message: "request body is missing".to_string(),
            detail: String::new(),
        }
    }

    /// Creates an error for a failed body read.
    #[must_use]
    pub fn read_failed(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            kind: ExtractionErrorKind::ReadFailed,
            message: format!("failed to read body: {detail}"),
            detail,
        }
    }

    /// Creates an error for a body that is not UTF-8.
    #[must_use]
    pub fn invalid_utf8(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            kind: ExtractionErrorKind::InvalidUtf8,
            message: format!("invalid UTF-8: {detail}"),
            detail,
        }
    }

    /// Creates an error for a scalar that failed to parse.
    #[must_use]
    pub fn parse_failed(type_name: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            kind: ExtractionErrorKind::ParseFailed,
            message: format!("invalid {type_name}: {detail}"),
            detail,
        }
    }

    /// Creates an error for deserialization failure.
    #[must_use]
    pub fn deserialization_failed(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to deserialize body: {detail}"),
            detail,
        }
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self {
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {limit} bytes"),
            detail: limit.to_string(),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> ExtractionErrorKind {
        self.kind
    }

    /// Returns the underlying message without any prefix.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for GatewayError {
    fn from(err: ExtractionError) -> Self {
        match err.kind {
            ExtractionErrorKind::Missing => GatewayError::missing_body(),
            ExtractionErrorKind::ReadFailed => GatewayError::body_read(err.message),
            ExtractionErrorKind::PayloadTooLarge => GatewayError::PayloadTooLarge {
                message: err.message,
            },
            ExtractionErrorKind::InvalidUtf8
            | ExtractionErrorKind::ParseFailed
            | ExtractionErrorKind::DeserializationFailed => GatewayError::format(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_missing_maps_to_missing_body() {
        let err: GatewayError = ExtractionError::missing().into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "request body is invalid");
    }

    #[test]
    fn test_read_failed_maps_to_server_error() {
        let err: GatewayError = ExtractionError::read_failed("connection reset").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_failed_keeps_detail() {
        let err = ExtractionError::parse_failed("i64", "invalid digit found in string");
        assert_eq!(err.kind(), ExtractionErrorKind::ParseFailed);
        assert_eq!(err.detail(), "invalid digit found in string");
        assert_eq!(err.to_string(), "invalid i64: invalid digit found in string");

        let gateway: GatewayError = err.into();
        assert_eq!(gateway.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_payload_too_large() {
        let err: GatewayError = ExtractionError::payload_too_large(16).into();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "payload too large: max 16 bytes");
    }
}
