//! Test request building.

use bytes::Bytes;
use canivete_extract::{BoxError, RequestBody};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use serde::Serialize;

use crate::error::TestError;

/// What the request carries after the headers.
#[derive(Debug, Clone)]
enum TestBody {
    /// No body at all: no framing headers and an ended stream.
    Absent,
    /// A complete body sent with `Content-Length`.
    Bytes(Bytes),
    /// A chunked body whose first read fails.
    Failing(String),
}

/// Builder for constructing test requests.
///
/// Requests built without [`body`](Self::body) or [`json`](Self::json) have
/// no body, which is distinct from an empty one.
///
/// ```rust
/// use canivete_test::TestRequestBuilder;
/// use http::Method;
///
/// let request = TestRequestBuilder::new(Method::POST, "/v1/datetime/fromunix")
///     .body("1700000000")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.headers()["content-length"], "10");
/// ```
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: TestBody,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: TestBody::Absent,
            error: None,
        }
    }

    /// Creates a GET request builder.
    pub fn get(uri: impl AsRef<str>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(uri: impl AsRef<str>) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Sets a header on the request.
    ///
    /// An invalid name or value is reported by [`build`](Self::build).
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw request body. An empty body is still a body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = TestBody::Bytes(body.into());
        self
    }

    /// Sets the request body as JSON and the matching Content-Type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = TestBody::Bytes(Bytes::from(bytes)),
            Err(e) => self.fail(TestError::Json(e)),
        }
        self.content_type("application/json")
    }

    /// Sends a chunked body that errors with `message` when read.
    pub fn failing_body(mut self, message: impl Into<String>) -> Self {
        self.body = TestBody::Failing(message.into());
        self
    }

    fn fail(&mut self, error: TestError) {
        // keep the first problem
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first header, JSON, or URI problem met while building.
    pub fn build(self) -> Result<Request<RequestBody>, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("invalid URI: {e}")))?;

        let mut headers = self.headers;
        let body = match self.body {
            TestBody::Absent => Empty::<Bytes>::new().map_err(BoxError::from).boxed_unsync(),
            TestBody::Bytes(bytes) => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                Full::new(bytes).map_err(BoxError::from).boxed_unsync()
            }
            TestBody::Failing(message) => {
                headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
                let stream = futures_util::stream::iter(vec![Err::<Frame<Bytes>, BoxError>(
                    message.into(),
                )]);
                StreamBody::new(stream).boxed_unsync()
            }
        };

        let mut request = Request::new(body);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }
}
