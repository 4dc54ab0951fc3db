//! Timestamp conversion backed by `chrono`.

use async_trait::async_trait;
use canivete_core::contract::FromUnixTimestampOutput;
use canivete_core::{DatetimeService, ServiceError, ServiceResult};
use chrono::{DateTime, Utc};

/// The layout of the Unix `date` command in the UTC zone.
pub const UNIX_DATE_FORMAT: &str = "%a %b %e %H:%M:%S UTC %Y";

/// Renders Unix timestamps as UTC calendar dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoDatetimeService;

impl ChronoDatetimeService {
    /// Creates the service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatetimeService for ChronoDatetimeService {
    async fn from_unix_timestamp(
        &self,
        unix_timestamp: i64,
    ) -> ServiceResult<FromUnixTimestampOutput> {
        let utc = DateTime::<Utc>::from_timestamp(unix_timestamp, 0).ok_or_else(|| {
            ServiceError::invalid_input(format!(
                "unix timestamp {unix_timestamp} is out of the supported range"
            ))
        })?;

        Ok(FromUnixTimestampOutput {
            unix_timestamp,
            utc_timestamp: utc.format(UNIX_DATE_FORMAT).to_string(),
        })
    }
}
