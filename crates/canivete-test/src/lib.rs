//! # Canivete Test
//!
//! In-memory HTTP testing for the canivete gateway.
//!
//! [`TestClient`] hands requests straight to [`Server::dispatch`], so tests
//! see exactly what a network client would: built-in routes, routing,
//! extraction, validation, and the `{"message": ...}` failure envelope.
//!
//! Requests distinguish three body states:
//!
//! - no call to `body`/`json`: no body at all
//! - `body("")`: an empty body with `Content-Length: 0`
//! - `failing_body(..)`: a chunked body whose read fails
//!
//! ## Example
//!
//! ```ignore
//! use canivete_test::TestClient;
//! use http::StatusCode;
//!
//! #[tokio::test]
//! async fn test_fromunix_rejects_text() {
//!     let client = TestClient::from_router(router);
//!
//!     client
//!         .post("/v1/datetime/fromunix")
//!         .body("yesterday")
//!         .send()
//!         .await
//!         .assert_status(StatusCode::BAD_REQUEST)
//!         .assert_message("unix timestamp must be an integer number");
//! }
//! ```
//!
//! [`Server::dispatch`]: canivete_server::Server::dispatch

#![doc(html_root_url = "https://docs.rs/canivete-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
