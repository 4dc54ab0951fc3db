//! `/programming` operations.

use std::sync::Arc;

use canivete_core::contract::{JwtDebuggerOutput, UuidOutput};
use canivete_core::{GatewayError, ProgrammingService};
use canivete_extract::{ExtractionContext, FromRequest, TrimmedText};
use canivete_server::{BodyPolicy, Capability, Dispatcher};
use http::Method;

/// Capability name and path segment.
pub const NAME: &str = "programming";

fn decode_token(ctx: &ExtractionContext) -> Result<String, GatewayError> {
    Ok(TrimmedText::from_request(ctx)?.into_inner())
}

/// Builds the capability around `service`.
///
/// A token the service cannot parse is reported as 400 with the service's
/// own message.
pub fn capability(service: Arc<dyn ProgrammingService>) -> Capability {
    let uuid: Dispatcher<dyn ProgrammingService, (), UuidOutput> = Dispatcher::new(
        "uuid",
        Arc::clone(&service),
        |_| Ok(()),
        |svc, ()| Box::pin(async move { svc.new_uuid().await.map_err(GatewayError::from) }),
    )
    .body_policy(BodyPolicy::Ignore);

    let jwt: Dispatcher<dyn ProgrammingService, String, JwtDebuggerOutput> =
        Dispatcher::new("jwt-debugger", service, decode_token, |svc, token| {
            Box::pin(async move { svc.debug_jwt(&token).await.map_err(GatewayError::from) })
        })
        .body_policy(BodyPolicy::Require)
        .read_failure("error reading the body");

    Capability::new(NAME)
        .operation(Method::GET, "/uuid", Arc::new(uuid))
        .operation(Method::POST, "/jwt-debugger", Arc::new(jwt))
}
