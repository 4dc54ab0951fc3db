//! `/internet` operations.

use std::sync::Arc;

use canivete_core::contract::ConvertMediumToMdOutput;
use canivete_core::{GatewayError, InternetService};
use canivete_extract::{ExtractionContext, FromRequest, TrimmedText};
use canivete_server::{BodyPolicy, Capability, Dispatcher};
use http::Method;

/// Capability name and path segment.
pub const NAME: &str = "internet";

fn decode_post_id(ctx: &ExtractionContext) -> Result<String, GatewayError> {
    Ok(TrimmedText::from_request(ctx)?.into_inner())
}

/// Builds the capability around `service`.
pub fn capability(service: Arc<dyn InternetService>) -> Capability {
    let medium: Dispatcher<dyn InternetService, String, ConvertMediumToMdOutput> =
        Dispatcher::new("medium-to-md", service, decode_post_id, |svc, post_id| {
            Box::pin(async move {
                svc.convert_medium_to_md(&post_id)
                    .await
                    .map_err(GatewayError::from)
            })
        })
        .body_policy(BodyPolicy::Require)
        .read_failure("error reading the body");

    Capability::new(NAME).operation(Method::POST, "/medium-to-md", Arc::new(medium))
}
