//! Core extractor trait.
//!
//! The [`FromRequest`] trait is implemented by everything that can be decoded
//! from a collected request.

use crate::{ExtractionContext, ExtractionError};

/// Trait for types that can be extracted from a collected request.
///
/// Extraction is synchronous: by the time an extractor runs the body has
/// already been read into the [`ExtractionContext`].
///
/// # Implementing `FromRequest`
///
/// ```rust
/// use canivete_extract::{FromRequest, ExtractionContext, ExtractionError};
///
/// struct ContentType(String);
///
/// impl FromRequest for ContentType {
///     fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
///         let value = ctx
///             .header("content-type")
///             .ok_or_else(|| ExtractionError::parse_failed("content-type", "header is absent"))?;
///         Ok(ContentType(value.to_string()))
///     }
/// }
/// ```
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if extraction fails.
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError>;
}

// Optional extraction: None if it fails
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx).ok())
    }
}

// Lets the caller inspect the error inline
impl<T: FromRequest> FromRequest for Result<T, ExtractionError> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx))
    }
}

impl FromRequest for () {
    fn from_request(_ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(())
    }
}
