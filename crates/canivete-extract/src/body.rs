//! Body reading and body extractors.
//!
//! [`read_body`] collects a streaming body under a size limit and
//! [`body_present`] decides whether a request carries a body at all. The
//! extractors then work on the collected bytes:
//!
//! | Extractor | Yields |
//! |-----------|--------|
//! | [`RawBody`] | the bytes |
//! | [`BodyString`] | the body as UTF-8 |
//! | [`TrimmedText`] | UTF-8 with one trailing `\n` removed |
//! | [`Scalar<T>`] | [`TrimmedText`] parsed with [`FromStr`] |

use crate::{ExtractionContext, ExtractionError, FromRequest};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::HeaderMap;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;

/// Boxed error type used by request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The request body type every endpoint receives.
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// Returns `true` if the request carries a body.
///
/// A body is present when the request declares one through `Content-Length`
/// or `Transfer-Encoding`, or when the stream has not already ended. A
/// `Content-Length: 0` body is present and empty.
pub fn body_present<B: Body>(headers: &HeaderMap, body: &B) -> bool {
    headers.contains_key(CONTENT_LENGTH)
        || headers.contains_key(TRANSFER_ENCODING)
        || !body.is_end_stream()
}

/// Collects the whole body, failing once more than `limit` bytes arrive.
///
/// # Errors
///
/// Returns a payload-too-large error when the limit is exceeded and a read
/// error when the stream itself fails.
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, ExtractionError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    // erase the error type so the future stays Send for any body
    let body: RequestBody = body.map_err(Into::<BoxError>::into).boxed_unsync();
    match Limited::new(body, limit).boxed_unsync().collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ExtractionError::payload_too_large(limit))
        }
        Err(err) => Err(ExtractionError::read_failed(err.to_string())),
    }
}

/// Extractor for raw request body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBody(pub Bytes);

impl RawBody {
    /// Consumes the RawBody and returns the inner Bytes.
    #[must_use]
    pub fn into_inner(self) -> Bytes {
        self.0
    }
}

impl Deref for RawBody {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for RawBody {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(RawBody(ctx.body().clone()))
    }
}

/// Extractor for the body as a string.
///
/// # Example
///
/// ```rust
/// use canivete_extract::{BodyString, FromRequest, ExtractionContextBuilder};
///
/// let ctx = ExtractionContextBuilder::new().body("Hello, World!").build();
///
/// let BodyString(text) = BodyString::from_request(&ctx).unwrap();
/// assert_eq!(text, "Hello, World!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyString(pub String);

impl BodyString {
    /// Consumes the BodyString and returns the inner String.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for BodyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for BodyString {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let text = std::str::from_utf8(ctx.body())
            .map_err(|e| ExtractionError::invalid_utf8(e.to_string()))?;
        Ok(BodyString(text.to_string()))
    }
}

/// Body text with exactly one trailing line feed removed.
///
/// Clients that pipe values through `echo` terminate them with `\n`; only the
/// last one is dropped, so `"42\n\n"` becomes `"42\n"`.
///
/// ```rust
/// use canivete_extract::TrimmedText;
///
/// assert_eq!(TrimmedText::trim("42\n"), "42");
/// assert_eq!(TrimmedText::trim("42\n\n"), "42\n");
/// assert_eq!(TrimmedText::trim("42"), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedText(pub String);

impl TrimmedText {
    /// Removes one trailing `\n` if present.
    #[must_use]
    pub fn trim(text: &str) -> &str {
        text.strip_suffix('\n').unwrap_or(text)
    }

    /// Consumes the extractor and returns the text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for TrimmedText {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for TrimmedText {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let BodyString(text) = BodyString::from_request(ctx)?;
        Ok(TrimmedText(Self::trim(&text).to_string()))
    }
}

/// A single value parsed from the trimmed body text.
///
/// ```rust
/// use canivete_extract::{Scalar, FromRequest, ExtractionContextBuilder};
///
/// let ctx = ExtractionContextBuilder::new().body("1638964800\n").build();
///
/// let Scalar(timestamp) = Scalar::<i64>::from_request(&ctx).unwrap();
/// assert_eq!(timestamp, 1_638_964_800);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar<T>(pub T);

impl<T> Scalar<T> {
    /// Consumes the extractor and returns the value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for Scalar<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let text = TrimmedText::from_request(ctx)?;
        text.parse::<T>().map(Scalar).map_err(|e| {
            ExtractionError::parse_failed(std::any::type_name::<T>(), e.to_string())
        })
    }
}
