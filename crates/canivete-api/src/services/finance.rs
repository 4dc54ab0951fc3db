//! Compound interest with regular contributions.
//!
//! The yearly rate `r` (a percentage) compounds `n` times per year. Regular
//! contributions of `PMT` are paid `p` times per year at the end of each
//! contribution period and grow at the equivalent per-period rate
//! `i = (1 + r/n)^(n/p) - 1`, so after `k` contributions:
//!
//! ```text
//! FV = P(1 + r/n)^(nT) + PMT * ((1 + i)^k - 1) / i * (1 + r/n)^(n(T - k/p))
//! ```
//!
//! The last factor carries the contributions from the last payment up to `T`
//! when `T` is not a whole number of contribution periods.

use async_trait::async_trait;
use canivete_core::contract::{
    CompoundInterestsDetail, CompoundInterestsHistoryEntry, CompoundInterestsOutput,
};
use canivete_core::{FinanceService, ServiceError, ServiceResult};

/// Longest term accepted, in years.
pub const MAX_TERM_YEARS: f64 = 1_000.0;

// absorbs float noise in p * T before flooring
const PERIOD_EPSILON: f64 = 1e-9;

/// Inputs of one calculation, in the units the contract documents.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Plan {
    invest_amount: f64,
    compound_periods: f64,
    time: f64,
    regular_contributions: f64,
    regular_contributions_period: f64,
    rate: f64,
}

impl Plan {
    fn check(&self) -> ServiceResult<()> {
        if self.compound_periods <= 0.0 {
            return Err(ServiceError::failed("compound periods must be greater than zero"));
        }
        if self.time <= 0.0 {
            return Err(ServiceError::failed("time must be greater than zero"));
        }
        if self.time > MAX_TERM_YEARS {
            return Err(ServiceError::failed(format!(
                "time must be at most {MAX_TERM_YEARS} years"
            )));
        }
        if self.regular_contributions != 0.0 && self.regular_contributions_period <= 0.0 {
            return Err(ServiceError::failed(
                "regular contributions period must be greater than zero",
            ));
        }
        Ok(())
    }

    fn growth(&self, years: f64) -> f64 {
        (1.0 + self.rate / self.compound_periods).powf(self.compound_periods * years)
    }

    fn contributions_made(&self, years: f64) -> f64 {
        if self.regular_contributions == 0.0 {
            return 0.0;
        }
        (self.regular_contributions_period * years + PERIOD_EPSILON).floor()
    }

    fn detail_at(&self, years: f64) -> ServiceResult<CompoundInterestsDetail> {
        let principal = self.invest_amount * self.growth(years);

        let made = self.contributions_made(years);
        let contributed = if made == 0.0 {
            0.0
        } else {
            let per_period = self.growth(1.0 / self.regular_contributions_period) - 1.0;
            let at_last_payment = if per_period.abs() < f64::EPSILON {
                self.regular_contributions * made
            } else {
                self.regular_contributions * ((1.0 + per_period).powf(made) - 1.0) / per_period
            };
            at_last_payment * self.growth(years - made / self.regular_contributions_period)
        };

        let final_amount = round_cents(principal + contributed);
        let total_contributions = round_cents(self.invest_amount + self.regular_contributions * made);
        let interests = round_cents(final_amount - total_contributions);

        if ![final_amount, total_contributions, interests]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ServiceError::failed("interest calculation overflowed"));
        }

        Ok(CompoundInterestsDetail {
            final_amount,
            total_contributions,
            interests,
        })
    }

    fn calculate(&self) -> ServiceResult<CompoundInterestsOutput> {
        self.check()?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole_years = self.time.floor() as u32;
        let mut history = (1..=whole_years)
            .map(|year| {
                Ok(CompoundInterestsHistoryEntry {
                    period: year.to_string(),
                    totals: self.detail_at(f64::from(year))?,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        let total = self.detail_at(self.time)?;
        if self.time.fract() != 0.0 {
            history.push(CompoundInterestsHistoryEntry {
                period: self.time.to_string(),
                totals: total.clone(),
            });
        }

        Ok(CompoundInterestsOutput { total, history })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The built-in compound interest calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundInterestCalculator;

impl CompoundInterestCalculator {
    /// Creates the calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FinanceService for CompoundInterestCalculator {
    async fn calculate_compound_interests(
        &self,
        invest_amount: f64,
        compound_periods: f64,
        time: f64,
        regular_contributions: f64,
        regular_contributions_period: f64,
        interest_rate: f64,
    ) -> ServiceResult<CompoundInterestsOutput> {
        let plan = Plan {
            invest_amount,
            compound_periods,
            time,
            regular_contributions,
            regular_contributions_period,
            rate: interest_rate / 100.0,
        };
        let output = plan.calculate()?;

        tracing::debug!(
            years = time,
            final_amount = output.total.final_amount,
            "compound interests calculated"
        );
        Ok(output)
    }
}
