//! JSON body extractor.

use crate::{ExtractionContext, ExtractionError, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Extractor for JSON request bodies.
///
/// Every body, empty ones included, goes through `serde_json`, so the error
/// detail is always serde's own message.
///
/// # Example
///
/// ```rust
/// use canivete_extract::{Json, FromRequest, ExtractionContextBuilder};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Deposit {
///     amount: f64,
/// }
///
/// let ctx = ExtractionContextBuilder::new().body(r#"{"amount": 10.5}"#).build();
/// let Json(deposit) = Json::<Deposit>::from_request(&ctx).unwrap();
/// assert_eq!(deposit.amount, 10.5);
///
/// let empty = ExtractionContextBuilder::new().body("").build();
/// let err = Json::<Deposit>::from_request(&empty).unwrap_err();
/// assert_eq!(err.detail(), "EOF while parsing a value at line 1 column 0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the Json and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Json<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        serde_json::from_slice(ctx.body())
            .map(Json)
            .map_err(|e| ExtractionError::deserialization_failed(e.to_string()))
    }
}
