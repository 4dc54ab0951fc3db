//! # Canivete Server
//!
//! HTTP serving for the canivete gateway.
//!
//! - [`Dispatcher`]: the single decode → validate → invoke → encode pipeline
//!   every operation runs through
//! - [`Router`] and [`Capability`]: route binding under a versioned prefix
//! - [`Server`]: hyper accept loop with `/health`, `/ready` and `/metrics`
//! - [`ShutdownSignal`] and [`ConnectionTracker`]: graceful shutdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use canivete_server::{Capability, Router, Server, TextEndpoint};
//! use http::Method;
//!
//! let router = Router::builder()
//!     .prefix("/v1")
//!     .route(Method::GET, "/", Arc::new(TextEndpoint::new("welcome", "hello")))
//!     .build()?;
//!
//! Server::builder().router(router).build().run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/canivete-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
pub mod handler;
mod health;
mod router;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_SIZE,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use handler::{
    BodyPolicy, Dispatcher, Endpoint, HttpResponse, TextEndpoint, REQUEST_ID_HEADER,
};
pub use health::{HealthCheck, HealthStatus, ReadinessCheck, ReadinessStatus};
pub use router::{Capability, RouteResolution, Router, RouterBuilder, RouterError};
pub use server::{Server, ServerBuilder, ServerError};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
