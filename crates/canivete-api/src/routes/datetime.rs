//! `/datetime` operations.

use std::sync::Arc;

use canivete_core::contract::FromUnixTimestampOutput;
use canivete_core::{DatetimeService, GatewayError};
use canivete_extract::{ExtractionContext, FromRequest, Scalar};
use canivete_server::{Capability, Dispatcher};
use http::Method;

/// Capability name and path segment.
pub const NAME: &str = "datetime";

/// Client message for any body that is not an integer.
pub const NOT_AN_INTEGER: &str = "unix timestamp must be an integer number";

fn decode_timestamp(ctx: &ExtractionContext) -> Result<i64, GatewayError> {
    Scalar::<i64>::from_request(ctx)
        .map(Scalar::into_inner)
        .map_err(|err| {
            tracing::debug!(detail = err.detail(), "timestamp rejected");
            GatewayError::format(NOT_AN_INTEGER)
        })
}

/// Builds the capability around `service`.
///
/// - `POST /fromunix`: decimal seconds since the epoch, one trailing newline allowed
pub fn capability(service: Arc<dyn DatetimeService>) -> Capability {
    let from_unix: Dispatcher<dyn DatetimeService, i64, FromUnixTimestampOutput> =
        Dispatcher::new("fromunix", service, decode_timestamp, |svc, timestamp| {
            Box::pin(async move {
                svc.from_unix_timestamp(timestamp)
                    .await
                    .map_err(GatewayError::from)
            })
        })
        .read_failure("request body is invalid");

    Capability::new(NAME).operation(Method::POST, "/fromunix", Arc::new(from_unix))
}
