//! `/finance` operations.

use std::sync::Arc;

use canivete_core::contract::CompoundInterestsOutput;
use canivete_core::{FinanceService, GatewayError};
use canivete_extract::{ExtractionContext, FieldValue, FromRequest, Json, Rule, Ruleset};
use canivete_server::{Capability, Dispatcher};
use http::Method;
use serde::Deserialize;

/// Capability name and path segment.
pub const NAME: &str = "finance";

/// Body of `POST /calculate-compound-interests`.
///
/// Keys are camelCase; PascalCase spellings are accepted too. Missing keys
/// are zero, which the rules then reject where a value is required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompoundInterestsInput {
    /// Yearly rate as a percentage.
    #[serde(alias = "InterestRate")]
    pub interest_rate: f64,
    /// Compounding periods per year.
    #[serde(alias = "CompoundPeriods")]
    pub compound_periods: f64,
    /// Initial investment.
    #[serde(alias = "InvestAmount")]
    pub invest_amount: f64,
    /// Amount of each regular contribution.
    #[serde(alias = "RegularContributions")]
    pub regular_contributions: f64,
    /// Contributions per year.
    #[serde(alias = "RegularContributionsPeriod")]
    pub regular_contributions_period: f64,
    /// Term in years.
    #[serde(alias = "Time")]
    pub time: f64,
}

/// Declaration order decides which violation is reported.
pub fn rules() -> Ruleset<CompoundInterestsInput> {
    Ruleset::new("calculateCompoundInterestsInput")
        .field(
            "InterestRate",
            |i: &CompoundInterestsInput| FieldValue::Number(i.interest_rate),
            &[Rule::Required],
        )
        .field(
            "CompoundPeriods",
            |i: &CompoundInterestsInput| FieldValue::Number(i.compound_periods),
            &[Rule::Required],
        )
        .field(
            "InvestAmount",
            |i: &CompoundInterestsInput| FieldValue::Number(i.invest_amount),
            &[Rule::Required],
        )
        .field(
            "RegularContributions",
            |i: &CompoundInterestsInput| FieldValue::Number(i.regular_contributions),
            &[],
        )
        .field(
            "RegularContributionsPeriod",
            |i: &CompoundInterestsInput| FieldValue::Number(i.regular_contributions_period),
            &[Rule::GreaterThan(0.0), Rule::RequiredWith("RegularContributions")],
        )
        .field(
            "Time",
            |i: &CompoundInterestsInput| FieldValue::Number(i.time),
            &[Rule::Required],
        )
}

fn decode_input(ctx: &ExtractionContext) -> Result<CompoundInterestsInput, GatewayError> {
    Json::<CompoundInterestsInput>::from_request(ctx)
        .map(Json::into_inner)
        .map_err(|err| GatewayError::format(format!("request body is invalid: {}", err.detail())))
}

/// Builds the capability around `service`.
pub fn capability(service: Arc<dyn FinanceService>) -> Capability {
    let compound: Dispatcher<dyn FinanceService, CompoundInterestsInput, CompoundInterestsOutput> =
        Dispatcher::new(
            "calculate-compound-interests",
            service,
            decode_input,
            |svc, input| {
                Box::pin(async move {
                    svc.calculate_compound_interests(
                        input.invest_amount,
                        input.compound_periods,
                        input.time,
                        input.regular_contributions,
                        input.regular_contributions_period,
                        input.interest_rate,
                    )
                    .await
                    .map_err(|e| {
                        GatewayError::from(e).context("unexpected error calculating interests")
                    })
                })
            },
        )
        .read_failure("unexpected error reading the body")
        .rules(rules());

    Capability::new(NAME).operation(
        Method::POST,
        "/calculate-compound-interests",
        Arc::new(compound),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CompoundInterestsInput {
        CompoundInterestsInput {
            interest_rate: 5.0,
            compound_periods: 12.0,
            invest_amount: 1000.0,
            regular_contributions: 0.0,
            regular_contributions_period: 12.0,
            time: 2.0,
        }
    }

    #[test]
    fn test_accepts_both_key_styles() {
        let camel: CompoundInterestsInput =
            serde_json::from_str(r#"{"interestRate": 5, "time": 2}"#).unwrap();
        let pascal: CompoundInterestsInput =
            serde_json::from_str(r#"{"InterestRate": 5, "Time": 2}"#).unwrap();

        assert_eq!(camel, pascal);
        assert_eq!(camel.interest_rate, 5.0);
        assert_eq!(camel.invest_amount, 0.0);
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(rules().check(&valid()).is_ok());
    }

    #[test]
    fn test_first_violation_wins() {
        let violation = rules().check(&CompoundInterestsInput::default()).unwrap_err();
        assert_eq!(
            violation.to_string(),
            "Key: 'calculateCompoundInterestsInput.InterestRate' Error:Field validation for 'InterestRate' failed on the 'required' tag"
        );
    }

    #[test]
    fn test_contribution_period_must_be_positive() {
        let input = CompoundInterestsInput {
            regular_contributions_period: 0.0,
            ..valid()
        };
        let violation = rules().check(&input).unwrap_err();
        assert_eq!(violation.rule().tag(), "gt");
        assert!(violation.to_string().contains("'RegularContributionsPeriod'"));
    }

    #[test]
    fn test_time_is_checked_last() {
        let input = CompoundInterestsInput { time: 0.0, ..valid() };
        let violation = rules().check(&input).unwrap_err();
        assert!(violation.to_string().contains("'Time' failed on the 'required' tag"));
    }
}
