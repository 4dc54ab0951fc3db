//! Test response wrapper.

use bytes::Bytes;
use canivete_core::ApiError;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::error::TestError;

/// A collected response with helpers for assertions.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Collects an HTTP response.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyRead`] if the body fails while collecting.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: hyper::body::Body + Send,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a response from raw parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the `x-request-id` header value.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header_str(canivete_server::REQUEST_ID_HEADER)
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if the body is not JSON.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Deserializes the body as the `{"message": ...}` failure envelope.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if the body is not an envelope.
    pub fn api_error(&self) -> Result<ApiError, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that the body is exactly the envelope `{"message": expected}`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an envelope or the message differs.
    pub fn assert_message(&self, expected: impl AsRef<str>) -> &Self {
        let envelope: serde_json::Value = match self.json() {
            Ok(value) => value,
            Err(e) => panic!("body is not JSON ({e}): {}", String::from_utf8_lossy(&self.body)),
        };
        assert_eq!(
            envelope,
            serde_json::json!({ "message": expected.as_ref() }),
            "unexpected failure envelope"
        );
        self
    }

    /// Asserts that the envelope message contains `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an envelope or lacks the substring.
    pub fn assert_message_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let message = match self.api_error() {
            Ok(envelope) => envelope.message,
            Err(e) => panic!("body is not an envelope ({e}): {}", String::from_utf8_lossy(&self.body)),
        };
        assert!(
            message.contains(expected),
            "message should contain '{expected}', got '{message}'"
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("header '{name}' not found"));
        assert_eq!(actual, expected, "header '{name}'");
        self
    }

    /// Asserts that the Content-Type header starts with `expected`.
    ///
    /// # Panics
    ///
    /// Panics if Content-Type is missing or doesn't match.
    pub fn assert_content_type(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let actual = self
            .content_type()
            .unwrap_or_else(|| panic!("Content-Type header not found"));
        assert!(
            actual.starts_with(expected),
            "Content-Type: expected '{expected}', got '{actual}'"
        );
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &String::from_utf8_lossy(&self.body))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_response(status: u16, body: &str) -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));
        TestResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Bytes::from(body.to_string()),
        )
    }

    #[test]
    fn test_status() {
        let response = create_response(422, "{}");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.status_code(), 422);
    }

    #[test]
    fn test_api_error() {
        let response = create_response(400, r#"{"message":"request body is invalid"}"#);
        let envelope = response.api_error().unwrap();
        assert_eq!(envelope.message, "request body is invalid");
    }

    #[test]
    fn test_assert_message() {
        create_response(400, r#"{"message":"bad"}"#)
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_message("bad")
            .assert_message_contains("ba");
    }

    #[test]
    #[should_panic(expected = "unexpected failure envelope")]
    fn test_assert_message_rejects_extra_fields() {
        create_response(400, r#"{"message":"bad","code":1}"#).assert_message("bad");
    }

    #[test]
    fn test_headers() {
        let response = create_response(200, "{}");
        assert_eq!(response.request_id(), Some("abc"));
        response
            .assert_header("x-request-id", "abc")
            .assert_content_type("application/json");
    }

    #[test]
    fn test_text_and_json() {
        let response = create_response(200, r#"{"uuid":"x"}"#);
        assert_eq!(response.text().unwrap(), r#"{"uuid":"x"}"#);
        assert_eq!(response.json_value().unwrap()["uuid"], "x");
    }
}
