//! Route binding and resolution.
//!
//! Operations are grouped into [`Capability`]s, each mounted under
//! `<prefix>/<name>`. Routes are fixed paths compared segment by segment.
//! One trailing slash is ignored, so `/v1/programming/uuid/` resolves like
//! `/v1/programming/uuid`; empty inner segments never match.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use canivete_server::{Capability, Router, RouteResolution, TextEndpoint};
//! use http::Method;
//!
//! let router = Router::builder()
//!     .prefix("/v1")
//!     .capability(
//!         Capability::new("greetings")
//!             .operation(Method::GET, "/hello", Arc::new(TextEndpoint::new("hello", "hi"))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert!(matches!(
//!     router.resolve(&Method::GET, "/v1/greetings/hello"),
//!     RouteResolution::Matched(_)
//! ));
//! assert!(matches!(
//!     router.resolve(&Method::POST, "/v1/greetings/hello"),
//!     RouteResolution::MethodNotAllowed(_)
//! ));
//! ```

use std::sync::Arc;

use http::header::{HeaderValue, ALLOW};
use http::{Method, Request};
use thiserror::Error;

use canivete_core::{GatewayError, RequestId};
use canivete_extract::RequestBody;

use crate::handler::{error_response, with_request_id, Endpoint, HttpResponse};

/// Errors raised while building a router.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Two registrations share a method and path.
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute {
        /// The method of the clashing route.
        method: Method,
        /// The full path of the clashing route.
        path: String,
    },
}

/// A named group of operations sharing a path prefix.
pub struct Capability {
    name: String,
    operations: Vec<(Method, String, Arc<dyn Endpoint>)>,
}

impl Capability {
    /// Creates an empty capability.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Adds one operation under this capability.
    #[must_use]
    pub fn operation(
        mut self,
        method: Method,
        suffix: impl Into<String>,
        endpoint: Arc<dyn Endpoint>,
    ) -> Self {
        self.operations.push((method, suffix.into(), endpoint));
        self
    }

    /// Returns the capability name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the capability has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field(
                "operations",
                &self
                    .operations
                    .iter()
                    .map(|(m, s, e)| format!("{m} {s} ({})", e.operation_id()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

struct Route {
    method: Method,
    path: String,
    segments: Vec<String>,
    endpoint: Arc<dyn Endpoint>,
}

/// The outcome of resolving a request against the route table.
pub enum RouteResolution<'a> {
    /// A route matched.
    Matched(&'a Arc<dyn Endpoint>),
    /// The path exists, but only for these methods.
    MethodNotAllowed(Vec<Method>),
    /// No route has this path.
    NotFound,
}

/// The immutable route table.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates a router builder.
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Lists `(method, path, operation id)` for every route.
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, &str, &str)> {
        self.routes
            .iter()
            .map(|r| (r.method.clone(), r.path.as_str(), r.endpoint.operation_id()))
            .collect()
    }

    /// Resolves a method and path.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> RouteResolution<'_> {
        let segments = split_path(path);
        let mut allowed = Vec::new();

        for route in self.routes.iter().filter(|r| r.segments == segments) {
            if route.method == *method {
                return RouteResolution::Matched(&route.endpoint);
            }
            allowed.push(route.method.clone());
        }

        if allowed.is_empty() {
            RouteResolution::NotFound
        } else {
            RouteResolution::MethodNotAllowed(allowed)
        }
    }

    /// Resolves and dispatches a request.
    pub async fn handle(&self, req: Request<RequestBody>, body_limit: usize) -> HttpResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match self.resolve(&method, &path) {
            RouteResolution::Matched(endpoint) => endpoint.call(req, body_limit).await,
            RouteResolution::MethodNotAllowed(allowed) => {
                tracing::debug!(%method, %path, "method not allowed");
                let mut response =
                    error_response(&GatewayError::method_not_allowed(&method, &path));
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(ALLOW, value);
                }
                with_request_id(response, RequestId::new())
            }
            RouteResolution::NotFound => {
                tracing::debug!(%method, %path, "no route");
                with_request_id(
                    error_response(&GatewayError::not_found(&path)),
                    RequestId::new(),
                )
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes())
            .finish()
    }
}

/// Builder for [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
    prefix: String,
    capabilities: Vec<Capability>,
    routes: Vec<(Method, String, Arc<dyn Endpoint>)>,
}

impl RouterBuilder {
    /// Sets the prefix capabilities are mounted under (e.g. `/v1`).
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Mounts a capability at `<prefix>/<name>`.
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Adds a route outside any capability, without the prefix.
    #[must_use]
    pub fn route(mut self, method: Method, path: impl Into<String>, endpoint: Arc<dyn Endpoint>) -> Self {
        self.routes.push((method, path.into(), endpoint));
        self
    }

    /// Builds the route table.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateRoute`] if a method and path are
    /// registered twice.
    pub fn build(self) -> Result<Router, RouterError> {
        let mut router = Router::default();

        for (method, path, endpoint) in self.routes {
            add_route(&mut router, method, path, endpoint)?;
        }

        for capability in self.capabilities {
            let base = join(&self.prefix, &capability.name);
            for (method, suffix, endpoint) in capability.operations {
                add_route(&mut router, method, join(&base, &suffix), endpoint)?;
            }
        }

        Ok(router)
    }
}

fn add_route(
    router: &mut Router,
    method: Method,
    path: String,
    endpoint: Arc<dyn Endpoint>,
) -> Result<(), RouterError> {
    let segments = split_path(&path);
    if router
        .routes
        .iter()
        .any(|r| r.method == method && r.segments == segments)
    {
        return Err(RouterError::DuplicateRoute { method, path });
    }

    tracing::debug!(%method, %path, operation = endpoint.operation_id(), "route registered");
    router.routes.push(Route {
        method,
        path,
        segments,
        endpoint,
    });
    Ok(())
}

fn split_path(path: &str) -> Vec<String> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        return Vec::new();
    }
    path.split('/').map(str::to_string).collect()
}

fn join(base: &str, suffix: &str) -> String {
    let base = base.trim_end_matches('/');
    let suffix = suffix.trim_start_matches('/');
    if suffix.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::TextEndpoint;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::{BodyExt, Empty};

    fn text(id: &str) -> Arc<dyn Endpoint> {
        Arc::new(TextEndpoint::new(id, id))
    }

    fn router() -> Router {
        Router::builder()
            .prefix("/v1")
            .capability(
                Capability::new("programming")
                    .operation(Method::GET, "/uuid", text("uuid"))
                    .operation(Method::POST, "/jwt-debugger", text("jwt-debugger")),
            )
            .route(Method::GET, "/", text("welcome"))
            .build()
            .unwrap()
    }

    fn empty_request(method: Method, path: &str) -> Request<RequestBody> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(
                Empty::<Bytes>::new()
                    .map_err(canivete_extract::BoxError::from)
                    .boxed_unsync(),
            )
            .unwrap()
    }

    fn operation<'a>(resolution: &RouteResolution<'a>) -> Option<&'a str> {
        match resolution {
            RouteResolution::Matched(endpoint) => Some(endpoint.operation_id()),
            _ => None,
        }
    }

    #[test]
    fn test_capability_routes_are_prefixed() {
        let router = router();
        assert_eq!(router.len(), 3);
        assert_eq!(
            operation(&router.resolve(&Method::GET, "/v1/programming/uuid")),
            Some("uuid")
        );
        assert_eq!(operation(&router.resolve(&Method::GET, "/")), Some("welcome"));
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let router = router();
        assert_eq!(
            operation(&router.resolve(&Method::GET, "/v1/programming/uuid/")),
            Some("uuid")
        );
    }

    #[test]
    fn test_empty_segments_do_not_match() {
        let router = router();
        assert!(matches!(
            router.resolve(&Method::GET, "/v1//programming///uuid"),
            RouteResolution::NotFound
        ));
        assert!(matches!(
            router.resolve(&Method::GET, "/v1/programming/uuid//"),
            RouteResolution::NotFound
        ));
        assert_eq!(operation(&router.resolve(&Method::GET, "")), Some("welcome"));
    }

    #[test]
    fn test_unknown_path() {
        let router = router();
        assert!(matches!(
            router.resolve(&Method::GET, "/v1/programming"),
            RouteResolution::NotFound
        ));
        assert!(matches!(
            router.resolve(&Method::GET, "/programming/uuid"),
            RouteResolution::NotFound
        ));
    }

    #[test]
    fn test_wrong_method_lists_allowed() {
        let router = router();
        match router.resolve(&Method::GET, "/v1/programming/jwt-debugger") {
            RouteResolution::MethodNotAllowed(allowed) => assert_eq!(allowed, vec![Method::POST]),
            _ => panic!("expected MethodNotAllowed"),
        }
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let result = Router::builder()
            .prefix("/v1")
            .capability(Capability::new("programming").operation(Method::GET, "/uuid", text("a")))
            .capability(Capability::new("programming").operation(Method::GET, "uuid/", text("b")))
            .build();

        assert_eq!(
            result.unwrap_err(),
            RouterError::DuplicateRoute {
                method: Method::GET,
                path: "/v1/programming/uuid/".to_string(),
            }
        );
    }

    #[test]
    fn test_same_path_different_methods_allowed() {
        let result = Router::builder()
            .route(Method::GET, "/items", text("list"))
            .route(Method::POST, "/items", text("create"))
            .build();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_handle_not_found_envelope() {
        let response = router()
            .handle(empty_request(Method::GET, "/v2/anything"), 1024)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"message":"no route for /v2/anything"}"#);
    }

    #[tokio::test]
    async fn test_handle_method_not_allowed_sets_allow() {
        let response = router()
            .handle(empty_request(Method::DELETE, "/v1/programming/uuid"), 1024)
            .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET");
    }

    #[tokio::test]
    async fn test_handle_dispatches() {
        let response = router().handle(empty_request(Method::GET, "/"), 1024).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
