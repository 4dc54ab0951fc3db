//! # Canivete Core
//!
//! Core types and contracts for the canivete gateway.
//!
//! This crate provides the foundational types used throughout canivete:
//!
//! - [`GatewayError`] - The failure taxonomy, each variant mapped to one HTTP status
//! - [`ApiError`] - The `{"message": ...}` envelope, the only failure body sent to clients
//! - [`RequestContext`] - Per-request context carrying the request id and operation
//! - [`contract`] - Service contracts, one async trait per capability
//! - [`fixtures`] - Test doubles for every service contract

#![doc(html_root_url = "https://docs.rs/canivete-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod contract;
mod error;
pub mod fixtures;

pub use context::{RequestContext, RequestId};
pub use contract::{
    DatetimeService, FinanceService, InternetService, ProgrammingService, ServiceError,
    ServiceResult,
};
pub use error::{ApiError, ErrorCategory, GatewayError, GatewayResult};
