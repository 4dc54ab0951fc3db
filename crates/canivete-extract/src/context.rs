//! Extraction context providing access to request data.
//!
//! The [`ExtractionContext`] is what extractors and decode functions see of a
//! request once its body has been collected.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// A collected request.
///
/// `body_present` records whether the request carried a body at all, which is
/// different from carrying an empty one.
///
/// # Example
///
/// ```rust
/// use canivete_extract::ExtractionContext;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let ctx = ExtractionContext::new(
///     Method::POST,
///     Uri::from_static("/v1/datetime/fromunix"),
///     HeaderMap::new(),
///     Bytes::from_static(b"1638964800\n"),
///     true,
/// );
///
/// assert_eq!(ctx.method(), &Method::POST);
/// assert!(ctx.body_present());
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    body_present: bool,
}

impl ExtractionContext {
    /// Creates a new extraction context.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        body_present: bool,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            body_present,
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the request body as bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns `true` if the request carried a body, even an empty one.
    #[must_use]
    pub fn body_present(&self) -> bool {
        self.body_present
    }
}

/// Builder for constructing an `ExtractionContext`, mostly for tests.
///
/// Calling [`body`](Self::body) marks the body as present.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    body_present: bool,
}

impl ExtractionContextBuilder {
    /// Creates a new builder for `GET /` with no body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self.body_present = true;
        self
    }

    /// Builds the extraction context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            body: self.body,
            body_present: self.body_present,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_context_builder() {
        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .uri(Uri::from_static("/v1/finance/calculate-compound-interests"))
            .header("content-type", "application/json")
            .body(r#"{"time": 1}"#)
            .build();

        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.path(), "/v1/finance/calculate-compound-interests");
        assert_eq!(ctx.header("content-type"), Some("application/json"));
        assert!(ctx.body_present());
    }

    #[test]
    fn test_builder_defaults_to_no_body() {
        let ctx = ExtractionContextBuilder::new().build();

        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.path(), "/");
        assert!(!ctx.body_present());
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn test_empty_body_is_still_present() {
        let ctx = ExtractionContextBuilder::new().body("").build();

        assert!(ctx.body_present());
        assert!(ctx.body().is_empty());
    }
}
