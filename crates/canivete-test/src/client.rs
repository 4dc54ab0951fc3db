//! Test client for in-memory HTTP testing.

use std::sync::Arc;

use bytes::Bytes;
use canivete_server::{Router, Server};
use http::Method;
use serde::Serialize;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// A client that sends requests straight into a [`Server`] without a socket.
///
/// Requests go through the same path as network traffic: built-in routes,
/// the router, and every dispatcher's extraction and validation.
///
/// ```rust,ignore
/// let client = TestClient::from_router(router);
///
/// let response = client.get("/v1/programming/uuid").send().await;
/// response.assert_status(StatusCode::OK);
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    server: Arc<Server>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a test client around a built server.
    pub fn new(server: Server) -> Self {
        Self {
            server: Arc::new(server),
            default_headers: Vec::new(),
        }
    }

    /// Creates a test client for a router, with default server settings.
    pub fn from_router(router: Router) -> Self {
        Self::new(Server::builder().router(router).build())
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the server under test.
    #[must_use]
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Creates a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let builder = self
            .default_headers
            .iter()
            .fold(TestRequestBuilder::new(method, uri), |builder, (name, value)| {
                builder.header(name, value)
            });
        TestClientRequest {
            client: self,
            builder,
        }
    }

    async fn send_internal(&self, builder: TestRequestBuilder) -> Result<TestResponse, TestError> {
        let request = builder.build()?;
        let response = self.server.dispatch(request).await;
        TestResponse::from_http(response).await
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends a body that fails mid-read.
    pub fn failing_body(mut self, message: impl Into<String>) -> Self {
        self.builder = self.builder.failing_body(message);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the response cannot be read.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request and returns a `Result`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the response
    /// cannot be read.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        self.client.send_internal(self.builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canivete_server::{Capability, TextEndpoint};
    use http::StatusCode;

    fn client() -> TestClient {
        let router = Router::builder()
            .prefix("/v1")
            .route(
                Method::GET,
                "/",
                Arc::new(TextEndpoint::new("welcome", "hello")),
            )
            .capability(Capability::new("misc").operation(
                Method::POST,
                "/echo",
                Arc::new(TextEndpoint::new("echo", "echoed")),
            ))
            .build()
            .unwrap();
        TestClient::from_router(router)
    }

    #[tokio::test]
    async fn test_routes_through_server() {
        let response = client().get("/").send().await;

        response
            .assert_status(StatusCode::OK)
            .assert_content_type("text/plain");
        assert_eq!(response.text().unwrap(), "hello");
        assert!(response.request_id().is_some());
    }

    #[tokio::test]
    async fn test_builtin_health_route() {
        let response = client().get("/health").send().await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.json_value().unwrap()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        client()
            .get("/v1/nope")
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .assert_message("no route for /v1/nope");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        client()
            .put("/v1/misc/echo")
            .send()
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED)
            .assert_header("allow", "POST");
    }

    #[tokio::test]
    async fn test_default_headers_are_sent() {
        let client = client().with_default_header("bad header", "x");
        let result = client.get("/").try_send().await;

        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
