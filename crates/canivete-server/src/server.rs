//! HTTP server implementation.
//!
//! The server consists of:
//!
//! - A TCP listener bound to the configured address
//! - One task per connection, served by hyper (HTTP/1.1, plus HTTP/2 when enabled)
//! - Built-in `/health`, `/ready` and `/metrics` routes
//! - The [`Router`] for everything else
//! - Graceful shutdown bounded by the shutdown timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use canivete_server::{Router, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder()
//!         .config(ServerConfig::builder().http_addr("0.0.0.0:8080").build())
//!         .router(Router::builder().build()?)
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use canivete_extract::{BoxError, RequestBody};
use canivete_telemetry::MetricsRegistry;

use crate::config::ServerConfig;
use crate::handler::{json_response, HttpResponse};
use crate::health::{HealthCheck, ReadinessCheck};
use crate::router::Router;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Server error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("Bind error: {0}")]
    BindError(String),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    IoError(String),
}

/// The canivete HTTP server.
pub struct Server {
    config: ServerConfig,
    router: Router,
    health: HealthCheck,
    readiness: ReadinessCheck,
    metrics: Option<MetricsRegistry>,
}

impl Server {
    /// Creates a server with the given configuration and routes.
    #[must_use]
    pub fn new(config: ServerConfig, router: Router) -> Self {
        let health = HealthCheck::new(config.service_name(), config.service_version());
        Self {
            config,
            router,
            health,
            readiness: ReadinessCheck::new(),
            metrics: None,
        }
    }

    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the health check.
    #[must_use]
    pub fn health(&self) -> &HealthCheck {
        &self.health
    }

    /// Returns the readiness check.
    #[must_use]
    pub fn readiness(&self) -> &ReadinessCheck {
        &self.readiness
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::BindError(format!(
                "Invalid address '{}': {}",
                self.config.http_addr(),
                e
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("Failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::IoError(e.to_string()))?;

        tracing::info!(
            addr = %local_addr,
            http2 = self.config.http2_enabled(),
            routes = self.router.len(),
            "server listening"
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(%remote_addr, error = %e, "connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, stopping server");
                    break;
                }
            }
        }

        server.readiness.set_ready(false);

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            connections = tracker.active_connections(),
            "waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_shutdown() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    connections = tracker.active_connections(),
                    "shutdown timeout reached"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), BoxError> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        if self.config.http2_enabled() {
            let builder = auto::Builder::new(TokioExecutor::new());
            let conn = builder.serve_connection(io, service);
            tokio::pin!(conn);

            tokio::select! {
                result = conn.as_mut() => result,
                () = shutdown.recv() => {
                    tracing::debug!(%remote_addr, "draining connection");
                    conn.as_mut().graceful_shutdown();
                    conn.await
                }
            }
        } else {
            let conn = http1::Builder::new().serve_connection(io, service);
            tokio::pin!(conn);

            tokio::select! {
                result = conn.as_mut() => result.map_err(Into::into),
                () = shutdown.recv() => {
                    tracing::debug!(%remote_addr, "draining connection");
                    conn.as_mut().graceful_shutdown();
                    conn.await.map_err(Into::into)
                }
            }
        }
    }

    async fn handle_request(&self, req: Request<Incoming>) -> Result<HttpResponse, Infallible> {
        let req = req.map(|body| body.map_err(BoxError::from).boxed_unsync());
        Ok(self.dispatch(req).await)
    }

    /// Handles one request, without any socket.
    ///
    /// Built-in routes are answered first; everything else goes to the router.
    pub async fn dispatch(&self, req: Request<RequestBody>) -> HttpResponse {
        tracing::trace!(method = %req.method(), path = req.uri().path(), "request");

        if *req.method() == Method::GET {
            match req.uri().path() {
                "/health" => return json_response(StatusCode::OK, &self.health.status()),
                "/ready" => return self.handle_ready(),
                "/metrics" => {
                    if let Some(metrics) = &self.metrics {
                        return Self::handle_metrics(metrics);
                    }
                }
                _ => {}
            }
        }

        self.router.handle(req, self.config.max_body_size()).await
    }

    fn handle_ready(&self) -> HttpResponse {
        let status = self.readiness.status();
        let code = if status.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(code, &status)
    }

    fn handle_metrics(metrics: &MetricsRegistry) -> HttpResponse {
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Full::new(Bytes::from(metrics.render())))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("router", &self.router)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Server`].
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<ServerConfig>,
    router: Option<Router>,
    metrics: Option<MetricsRegistry>,
}

impl ServerBuilder {
    /// Creates a new server builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the route table.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Serves `/metrics` from this registry.
    #[must_use]
    pub fn metrics(mut self, registry: Option<MetricsRegistry>) -> Self {
        self.metrics = registry;
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let mut server = Server::new(
            self.config.unwrap_or_default(),
            self.router.unwrap_or_default(),
        );
        server.metrics = self.metrics;
        server
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::TextEndpoint;
    use crate::health::HealthStatus;
    use http_body_util::Empty;
    use std::time::Duration;

    fn get(path: &str) -> Request<RequestBody> {
        Request::builder()
            .uri(path)
            .body(Empty::<Bytes>::new().map_err(BoxError::from).boxed_unsync())
            .unwrap()
    }

    async fn body_bytes(response: HttpResponse) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    fn welcome_server() -> Server {
        let router = Router::builder()
            .route(Method::GET, "/", Arc::new(TextEndpoint::new("welcome", "hi")))
            .build()
            .unwrap();
        Server::builder().router(router).build()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = Server::builder()
            .config(
                ServerConfig::builder()
                    .service_name("gateway")
                    .service_version("2.0.0")
                    .build(),
            )
            .build();

        let response = server.dispatch(get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let status: HealthStatus = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(status.service, "gateway");
        assert_eq!(status.version, "2.0.0");
    }

    #[tokio::test]
    async fn test_ready_endpoint_follows_readiness() {
        let server = Server::builder().build();
        assert_eq!(server.dispatch(get("/ready")).await.status(), StatusCode::OK);

        server.readiness().set_ready(false);
        assert_eq!(
            server.dispatch(get("/ready")).await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_registry() {
        let server = Server::builder().build();
        let response = server.dispatch(get("/metrics")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dispatch_falls_through_to_router() {
        let response = welcome_server().dispatch(get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&body_bytes(response).await[..], b"hi");
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::BindError("Address in use".to_string());
        assert_eq!(err.to_string(), "Bind error: Address in use");
    }

    #[tokio::test]
    async fn test_run_invalid_address() {
        let server = Server::builder()
            .config(ServerConfig::builder().http_addr("not-a-valid-address").build())
            .build();

        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        match result {
            Err(ServerError::BindError(msg)) => assert!(msg.contains("Invalid address")),
            other => panic!("expected BindError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_and_shutdown() {
        let server = Server::builder()
            .config(
                ServerConfig::builder()
                    .http_addr("127.0.0.1:0")
                    .shutdown_timeout(Duration::from_millis(100))
                    .build(),
            )
            .build();

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result =
            tokio::time::timeout(Duration::from_secs(5), server.run_with_shutdown(shutdown)).await;
        tokio_test::assert_ok!(result.unwrap());
    }
}
