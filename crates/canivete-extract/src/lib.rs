//! # Canivete Extract
//!
//! Request body handling for the canivete gateway.
//!
//! Reading and decoding are split in two. [`read_body`] collects the streaming
//! body under a size limit and [`body_present`] tells an absent body from an
//! empty one. Extractors then decode the collected bytes synchronously:
//!
//! | Extractor | Description |
//! |-----------|-------------|
//! | [`RawBody`] | Raw request bytes |
//! | [`BodyString`] | Body as UTF-8 |
//! | [`TrimmedText`] | UTF-8 with one trailing line feed removed |
//! | [`Scalar<T>`] | A single value parsed from [`TrimmedText`] |
//! | [`Json<T>`] | `serde_json` deserialization |
//!
//! The [`validate`] module holds the declarative rule lists checked after
//! decoding.
//!
//! ## Error Handling
//!
//! All extractors return [`ExtractionError`], which converts into a
//! [`canivete_core::GatewayError`] with the matching status.

#![doc(html_root_url = "https://docs.rs/canivete-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod context;
mod error;
mod extractor;
mod json;
pub mod validate;

pub use body::{
    body_present, read_body, BodyString, BoxError, RawBody, RequestBody, Scalar, TrimmedText,
};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ExtractionError, ExtractionErrorKind};
pub use extractor::FromRequest;
pub use json::Json;
pub use validate::{FieldValue, Rule, Ruleset, Violation};
