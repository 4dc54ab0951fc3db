//! canivete-api - a pocket knife of small developer utilities over HTTP
//!
//! Every capability is a thin HTTP surface over a service contract from
//! `canivete-core`. The binary wires the built-in services; the library
//! exposes the same wiring so tests and embedders can swap any service out.
//!
//! # Routes
//!
//! | Method | Path                                       | Service       |
//! |--------|--------------------------------------------|---------------|
//! | GET    | `/`                                        | welcome text  |
//! | POST   | `/v1/datetime/fromunix`                    | datetime      |
//! | POST   | `/v1/finance/calculate-compound-interests` | finance       |
//! | GET    | `/v1/programming/uuid`                     | programming   |
//! | POST   | `/v1/programming/jwt-debugger`             | programming   |
//! | POST   | `/v1/internet/medium-to-md`                | internet      |
//!
//! Failures always answer `{"message": "..."}`.
//!
//! # Example Usage
//!
//! ```bash
//! $ canivete-api --config /etc/canivete/canivete.toml
//!
//! $ PORT=3000 CANIVETE_LOG_LEVEL=debug canivete-api
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;

pub use app::{build_router, run, Services, API_PREFIX, WELCOME_MESSAGE};
pub use config::{CaniveteConfig, RejectedOverride};
pub use error::{AppError, AppResult};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_exports() {
        let config = CaniveteConfig::default();
        assert!(config.validate().is_ok());
    }
}
