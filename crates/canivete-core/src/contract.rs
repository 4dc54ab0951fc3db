//! Service contracts.
//!
//! Each capability the gateway exposes is backed by one contract. The gateway
//! only ever talks to a `dyn` contract; concrete implementations are injected
//! once at startup and shared across requests. Any state an implementation
//! keeps is its own concern.
//!
//! Every method returns [`ServiceResult`]. A contract signals input it
//! understands but rejects with [`ServiceError::InvalidInput`]; everything
//! else is [`ServiceError::Failed`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Result type returned by service contracts.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure reported by a service contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service understood the input and rejected it.
    #[error("{0}")]
    InvalidInput(String),

    /// The service failed for any other reason.
    #[error("{0}")]
    Failed(String),
}

impl ServiceError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a generic failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

// ---------------------------------------------------------------------------
// datetime
// ---------------------------------------------------------------------------

/// Output of [`DatetimeService::from_unix_timestamp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromUnixTimestampOutput {
    /// The timestamp as received.
    pub unix_timestamp: i64,
    /// The timestamp rendered as a UTC calendar date.
    pub utc_timestamp: String,
}

/// Date and time conversions.
#[async_trait]
pub trait DatetimeService: Send + Sync {
    /// Converts seconds since the Unix epoch to a UTC calendar timestamp.
    async fn from_unix_timestamp(&self, unix_timestamp: i64)
        -> ServiceResult<FromUnixTimestampOutput>;
}

// ---------------------------------------------------------------------------
// finance
// ---------------------------------------------------------------------------

/// Totals for a compound interest calculation at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundInterestsDetail {
    /// Invested amount plus contributions plus interests.
    pub final_amount: f64,
    /// Initial investment plus every regular contribution.
    pub total_contributions: f64,
    /// Interests earned.
    pub interests: f64,
}

/// One period of the calculation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundInterestsHistoryEntry {
    /// Period label.
    pub period: String,
    /// Totals at the end of the period.
    pub totals: CompoundInterestsDetail,
}

/// Output of [`FinanceService::calculate_compound_interests`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundInterestsOutput {
    /// Totals at the end of the whole term.
    pub total: CompoundInterestsDetail,
    /// Totals per period.
    pub history: Vec<CompoundInterestsHistoryEntry>,
}

/// Financial calculations.
#[async_trait]
pub trait FinanceService: Send + Sync {
    /// Calculates compound interests with optional regular contributions.
    ///
    /// `interest_rate` is a yearly percentage, `compound_periods` and
    /// `regular_contributions_period` are counts per year and `time` is in years.
    async fn calculate_compound_interests(
        &self,
        invest_amount: f64,
        compound_periods: f64,
        time: f64,
        regular_contributions: f64,
        regular_contributions_period: f64,
        interest_rate: f64,
    ) -> ServiceResult<CompoundInterestsOutput>;
}

// ---------------------------------------------------------------------------
// programming
// ---------------------------------------------------------------------------

/// Output of [`ProgrammingService::new_uuid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UuidOutput {
    /// Hyphenated UUID string.
    pub uuid: String,
}

/// Output of [`ProgrammingService::debug_jwt`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtDebuggerOutput {
    /// Decoded JOSE header.
    pub header: Map<String, Value>,
    /// Decoded claims.
    pub payload: Map<String, Value>,
}

/// Developer utilities.
#[async_trait]
pub trait ProgrammingService: Send + Sync {
    /// Generates a new UUID.
    async fn new_uuid(&self) -> ServiceResult<UuidOutput>;

    /// Decodes the header and payload of a JWT without verifying it.
    async fn debug_jwt(&self, token: &str) -> ServiceResult<JwtDebuggerOutput>;
}

// ---------------------------------------------------------------------------
// internet
// ---------------------------------------------------------------------------

/// Output of [`InternetService::convert_medium_to_md`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertMediumToMdOutput {
    /// Identifier of the converted post.
    pub post_id: String,
    /// Post rendered as Markdown.
    pub markdown: String,
}

/// Internet utilities.
#[async_trait]
pub trait InternetService: Send + Sync {
    /// Fetches a Medium post and renders it as Markdown.
    async fn convert_medium_to_md(&self, post_id: &str) -> ServiceResult<ConvertMediumToMdOutput>;
}
