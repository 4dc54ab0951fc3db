//! Operation dispatch.
//!
//! Every operation runs through one parametric pipeline, [`Dispatcher`]:
//!
//! ```text
//! presence check → read body → decode → validate → invoke → encode
//! ```
//!
//! Each step either hands its output to the next one or ends the request with
//! a [`GatewayError`], which is rendered as the `{"message": ...}` envelope
//! with the error's status. Nothing is retried and nothing after the failing
//! step runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use canivete_extract::{FromRequest, Scalar};
//! use canivete_server::handler::{BodyPolicy, Dispatcher};
//!
//! let endpoint = Dispatcher::new(
//!     "fromunix",
//!     datetime_service,
//!     |ctx| Scalar::<i64>::from_request(ctx).map_err(Into::into),
//!     |svc, Scalar(ts)| Box::pin(async move { Ok(svc.from_unix_timestamp(ts).await?) }),
//! )
//! .read_failure("request body is invalid");
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::Instrument;

use canivete_core::{GatewayError, RequestContext, RequestId};
use canivete_extract::{
    body_present, read_body, ExtractionContext, ExtractionErrorKind, RequestBody, Ruleset,
};
use canivete_telemetry::{
    record_request, record_request_size, record_validation_failure, InFlightGuard,
};

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Type alias for a boxed service invocation.
pub type BoxedInvokeResult<Out> =
    Pin<Box<dyn Future<Output = Result<Out, GatewayError>> + Send>>;

/// A type-erased service invocation bound to one contract method.
pub type Invoker<Svc, Shape, Out> =
    Arc<dyn Fn(Arc<Svc>, Shape) -> BoxedInvokeResult<Out> + Send + Sync>;

/// Turns the collected request into the operation's request shape.
pub type Decoder<Shape> = fn(&ExtractionContext) -> Result<Shape, GatewayError>;

/// Header carrying the per-request id on every response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// How an operation treats the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyPolicy {
    /// The body is never read.
    Ignore,
    /// The body is read; an absent body reads as empty.
    #[default]
    Read,
    /// The body must be present, even if empty.
    Require,
}

/// A routable, type-erased operation.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// The operation id used in logs and metrics.
    fn operation_id(&self) -> &str;

    /// Handles one request.
    async fn call(&self, req: Request<RequestBody>, body_limit: usize) -> HttpResponse;
}

/// The request pipeline for one operation.
///
/// `Svc` is the injected service contract (usually a `dyn` trait), `Shape`
/// the decoded request and `Out` the serialized success payload.
pub struct Dispatcher<Svc: ?Sized, Shape, Out> {
    operation_id: String,
    service: Arc<Svc>,
    body_policy: BodyPolicy,
    read_failure: String,
    decode: Decoder<Shape>,
    rules: Ruleset<Shape>,
    invoke: Invoker<Svc, Shape, Out>,
}

impl<Svc, Shape, Out> Dispatcher<Svc, Shape, Out>
where
    Svc: ?Sized + Send + Sync + 'static,
    Shape: Send + 'static,
    Out: Serialize + Send + 'static,
{
    /// Creates a dispatcher that reads the body and applies no rules.
    pub fn new<F>(
        operation_id: impl Into<String>,
        service: Arc<Svc>,
        decode: Decoder<Shape>,
        invoke: F,
    ) -> Self
    where
        F: Fn(Arc<Svc>, Shape) -> BoxedInvokeResult<Out> + Send + Sync + 'static,
    {
        Self {
            operation_id: operation_id.into(),
            service,
            body_policy: BodyPolicy::Read,
            read_failure: "error reading the body".to_string(),
            decode,
            rules: Ruleset::none(),
            invoke: Arc::new(invoke),
        }
    }

    /// Sets the body policy.
    #[must_use]
    pub fn body_policy(mut self, policy: BodyPolicy) -> Self {
        self.body_policy = policy;
        self
    }

    /// Sets the message reported when the body stream fails.
    #[must_use]
    pub fn read_failure(mut self, message: impl Into<String>) -> Self {
        self.read_failure = message.into();
        self
    }

    /// Sets the validation rules checked after decoding.
    #[must_use]
    pub fn rules(mut self, rules: Ruleset<Shape>) -> Self {
        self.rules = rules;
        self
    }

    async fn run(&self, req: Request<RequestBody>, body_limit: usize) -> Result<Out, GatewayError> {
        let (parts, body) = req.into_parts();
        let present = body_present(&parts.headers, &body);

        if self.body_policy == BodyPolicy::Require && !present {
            return Err(GatewayError::missing_body());
        }

        let bytes = match self.body_policy {
            BodyPolicy::Ignore => Bytes::new(),
            BodyPolicy::Read | BodyPolicy::Require => self.read(body, body_limit).await?,
        };
        record_request_size(&self.operation_id, bytes.len());

        let shape = {
            let ctx = ExtractionContext::new(parts.method, parts.uri, parts.headers, bytes, present);
            (self.decode)(&ctx)?
        };

        if let Err(violation) = self.rules.check(&shape) {
            record_validation_failure(&self.operation_id, violation.rule().tag());
            return Err(GatewayError::validation(violation.to_string()));
        }

        (self.invoke)(Arc::clone(&self.service), shape).await
    }

    async fn read(&self, body: RequestBody, limit: usize) -> Result<Bytes, GatewayError> {
        read_body(body, limit).await.map_err(|err| {
            if err.kind() == ExtractionErrorKind::PayloadTooLarge {
                return err.into();
            }
            tracing::error!(detail = err.detail(), "failed to read request body");
            GatewayError::body_read(self.read_failure.as_str())
        })
    }
}

#[async_trait]
impl<Svc, Shape, Out> Endpoint for Dispatcher<Svc, Shape, Out>
where
    Svc: ?Sized + Send + Sync + 'static,
    Shape: Send + 'static,
    Out: Serialize + Send + 'static,
{
    fn operation_id(&self) -> &str {
        &self.operation_id
    }

    async fn call(&self, req: Request<RequestBody>, body_limit: usize) -> HttpResponse {
        let ctx = RequestContext::new(self.operation_id.as_str());
        let span = tracing::info_span!(
            "dispatch",
            operation = %self.operation_id,
            request_id = %ctx.request_id(),
        );
        let _in_flight = InFlightGuard::new();

        let response = async {
            let response = match self.run(req, body_limit).await {
                Ok(output) => json_response(StatusCode::OK, &output),
                Err(err) => {
                    log_failure(&err);
                    error_response(&err)
                }
            };
            tracing::debug!(
                status = response.status().as_u16(),
                elapsed_ms = elapsed_millis(ctx.elapsed()),
                "request completed"
            );
            response
        }
        .instrument(span)
        .await;

        record_request(&self.operation_id, response.status().as_u16(), ctx.elapsed());
        with_request_id(response, ctx.request_id())
    }
}

/// An endpoint that always answers with the same plain text.
#[derive(Debug, Clone)]
pub struct TextEndpoint {
    operation_id: String,
    text: String,
}

impl TextEndpoint {
    /// Creates a text endpoint.
    #[must_use]
    pub fn new(operation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl Endpoint for TextEndpoint {
    fn operation_id(&self) -> &str {
        &self.operation_id
    }

    async fn call(&self, _req: Request<RequestBody>, _body_limit: usize) -> HttpResponse {
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, TEXT_CONTENT_TYPE)
            .body(Full::new(Bytes::from(self.text.clone())))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())));
        with_request_id(response, RequestId::new())
    }
}

/// Serializes `value` as a JSON response with the given status.
///
/// Falls back to a 500 envelope if `value` cannot be serialized.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> HttpResponse {
    match serde_json::to_vec(value) {
        Ok(body) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(Full::new(Bytes::from(body)))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new()))),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response");
            error_response(&GatewayError::service(format!(
                "failed to encode response: {e}"
            )))
        }
    }
}

/// Renders a failure as the `{"message": ...}` envelope.
pub fn error_response(err: &GatewayError) -> HttpResponse {
    let body = serde_json::to_vec(&err.to_envelope())
        .unwrap_or_else(|_| br#"{"message":"internal error"}"#.to_vec());

    Response::builder()
        .status(err.status_code())
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Stamps the request id header onto a response.
#[must_use]
pub fn with_request_id(mut response: HttpResponse, request_id: RequestId) -> HttpResponse {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn log_failure(err: &GatewayError) {
    let status = err.status_code().as_u16();
    if err.is_server_error() {
        tracing::error!(status, category = ?err.category(), error = %err, "operation failed");
    } else {
        tracing::warn!(status, category = ?err.category(), error = %err, "request rejected");
    }
}
