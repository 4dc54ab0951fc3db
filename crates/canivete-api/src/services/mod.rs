//! Built-in implementations of the service contracts.
//!
//! Each one is constructed once at startup and handed to its capability as an
//! `Arc<dyn …Service>`; any of them can be swapped for another implementation
//! of the same contract.

mod datetime;
mod finance;
mod internet;
mod programming;

pub use datetime::{ChronoDatetimeService, UNIX_DATE_FORMAT};
pub use finance::{CompoundInterestCalculator, MAX_TERM_YEARS};
pub use internet::{MediumService, IMAGE_BASE_URL, JSON_HIJACKING_PREFIX};
pub use programming::StandardProgrammingService;
