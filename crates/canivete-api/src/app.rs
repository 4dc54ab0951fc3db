//! Wiring: services, routes and the server.

use std::sync::Arc;

use canivete_core::{DatetimeService, FinanceService, InternetService, ProgrammingService};
use canivete_server::{Router, RouterError, Server, TextEndpoint};
use http::Method;
use tracing::info;

use crate::config::CaniveteConfig;
use crate::error::AppResult;
use crate::routes;
use crate::services::{
    ChronoDatetimeService, CompoundInterestCalculator, MediumService, StandardProgrammingService,
};

/// Body of `GET /`.
pub const WELCOME_MESSAGE: &str = "Welcome to canivete-api!";

/// Prefix every capability is mounted under.
pub const API_PREFIX: &str = "/v1";

/// The service implementations, one per capability.
///
/// Built once at startup and shared by every request.
#[derive(Clone)]
pub struct Services {
    /// Backs `/v1/datetime`.
    pub datetime: Arc<dyn DatetimeService>,
    /// Backs `/v1/finance`.
    pub finance: Arc<dyn FinanceService>,
    /// Backs `/v1/programming`.
    pub programming: Arc<dyn ProgrammingService>,
    /// Backs `/v1/internet`.
    pub internet: Arc<dyn InternetService>,
}

impl Services {
    /// The built-in implementations, configured from `config`.
    pub fn from_config(config: &CaniveteConfig) -> AppResult<Self> {
        let medium = MediumService::new(
            config.internet.medium_base_url.clone(),
            config.internet.request_timeout,
        )?;

        Ok(Self {
            datetime: Arc::new(ChronoDatetimeService::new()),
            finance: Arc::new(CompoundInterestCalculator::new()),
            programming: Arc::new(StandardProgrammingService::new()),
            internet: Arc::new(medium),
        })
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Builds the full route table.
pub fn build_router(services: &Services) -> Result<Router, RouterError> {
    Router::builder()
        .route(
            Method::GET,
            "/",
            Arc::new(TextEndpoint::new("welcome", WELCOME_MESSAGE)),
        )
        .prefix(API_PREFIX)
        .capability(routes::datetime::capability(Arc::clone(&services.datetime)))
        .capability(routes::finance::capability(Arc::clone(&services.finance)))
        .capability(routes::programming::capability(Arc::clone(
            &services.programming,
        )))
        .capability(routes::internet::capability(Arc::clone(&services.internet)))
        .build()
}

/// Installs telemetry, wires the services and serves until a shutdown signal.
pub async fn run(config: CaniveteConfig) -> AppResult<()> {
    let metrics = canivete_telemetry::init_telemetry(&config.telemetry_config())?;
    config.log_rejected_overrides();

    let services = Services::from_config(&config)?;
    let router = build_router(&services)?;

    info!(
        version = crate::VERSION,
        addr = %config.http_addr(),
        routes = router.len(),
        "starting canivete-api"
    );

    let server = Server::builder()
        .config(config.server_config())
        .router(router)
        .metrics(metrics)
        .build();

    server.run().await?;
    info!("canivete-api stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_has_every_operation() {
        let services = Services::from_config(&CaniveteConfig::default()).unwrap();
        let router = build_router(&services).unwrap();

        let mut routes: Vec<(String, String)> = router
            .routes()
            .into_iter()
            .map(|(method, path, _)| (method.to_string(), path.to_string()))
            .collect();
        routes.sort();

        assert_eq!(
            routes,
            vec![
                ("GET".to_string(), "/".to_string()),
                ("GET".to_string(), "/v1/programming/uuid".to_string()),
                ("POST".to_string(), "/v1/datetime/fromunix".to_string()),
                (
                    "POST".to_string(),
                    "/v1/finance/calculate-compound-interests".to_string()
                ),
                ("POST".to_string(), "/v1/internet/medium-to-md".to_string()),
                ("POST".to_string(), "/v1/programming/jwt-debugger".to_string()),
            ]
        );
    }

    #[test]
    fn test_operation_ids() {
        let services = Services::from_config(&CaniveteConfig::default()).unwrap();
        let router = build_router(&services).unwrap();

        let mut ids: Vec<&str> = router.routes().into_iter().map(|(_, _, id)| id).collect();
        ids.sort_unstable();
        assert_eq!(
            ids,
            vec![
                "calculate-compound-interests",
                "fromunix",
                "jwt-debugger",
                "medium-to-md",
                "uuid",
                "welcome"
            ]
        );
    }
}
