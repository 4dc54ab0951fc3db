//! Declarative field validation.
//!
//! A [`Ruleset`] is an ordered list of fields, each with an accessor and an
//! ordered list of [`Rule`]s. [`Ruleset::check`] walks fields and rules in
//! declaration order and stops at the first violation, so the reported
//! message is reproducible for a given input.
//!
//! # Example
//!
//! ```rust
//! use canivete_extract::validate::{FieldValue, Rule, Ruleset};
//!
//! struct Loan {
//!     amount: f64,
//!     installments: f64,
//! }
//!
//! let rules = Ruleset::new("Loan")
//!     .field("Amount", |l: &Loan| FieldValue::Number(l.amount), &[Rule::Required])
//!     .field("Installments", |l: &Loan| FieldValue::Number(l.installments), &[Rule::GreaterThan(0.0)]);
//!
//! assert!(rules.check(&Loan { amount: 10.0, installments: 2.0 }).is_ok());
//!
//! let violation = rules.check(&Loan { amount: 0.0, installments: 0.0 }).unwrap_err();
//! assert_eq!(
//!     violation.to_string(),
//!     "Key: 'Loan.Amount' Error:Field validation for 'Amount' failed on the 'required' tag"
//! );
//! ```

use std::fmt;

/// A single constraint on a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// The field must hold a non-zero value.
    Required,
    /// The field must hold a non-zero value whenever the named sibling does.
    RequiredWith(&'static str),
    /// The number (or text length) must exceed the threshold. An absent value counts as zero.
    GreaterThan(f64),
}

impl Rule {
    /// The tag used in violation messages.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::RequiredWith(_) => "required_with",
            Self::GreaterThan(_) => "gt",
        }
    }
}

/// The value an accessor reads out of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// A numeric field.
    Number(f64),
    /// A text field.
    Text(&'a str),
    /// A field the request left out.
    Absent,
}

impl FieldValue<'_> {
    /// Returns `true` for the zero value of the field's type.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0.0,
            Self::Text(s) => s.is_empty(),
            Self::Absent => true,
        }
    }

    fn magnitude(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.chars().count() as f64,
            Self::Absent => 0.0,
        }
    }
}

/// Reads one field out of a shape.
pub type Accessor<T> = fn(&T) -> FieldValue<'_>;

struct Field<T> {
    name: &'static str,
    accessor: Accessor<T>,
    rules: Vec<Rule>,
}

/// Ordered validation rules for one request shape.
pub struct Ruleset<T> {
    shape: &'static str,
    fields: Vec<Field<T>>,
}

impl<T> Ruleset<T> {
    /// Creates an empty ruleset for the named shape.
    #[must_use]
    pub fn new(shape: &'static str) -> Self {
        Self {
            shape,
            fields: Vec::new(),
        }
    }

    /// A ruleset that accepts everything.
    #[must_use]
    pub fn none() -> Self {
        Self::new("")
    }

    /// Appends a field with its rules.
    #[must_use]
    pub fn field(mut self, name: &'static str, accessor: Accessor<T>, rules: &[Rule]) -> Self {
        self.fields.push(Field {
            name,
            accessor,
            rules: rules.to_vec(),
        });
        self
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks `value`, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`Violation`] in declaration order.
    pub fn check(&self, value: &T) -> Result<(), Violation> {
        for field in &self.fields {
            let current = (field.accessor)(value);
            for rule in &field.rules {
                if !self.satisfies(value, current, *rule) {
                    return Err(Violation {
                        shape: self.shape,
                        field: field.name,
                        rule: *rule,
                    });
                }
            }
        }
        Ok(())
    }

    fn satisfies(&self, value: &T, current: FieldValue<'_>, rule: Rule) -> bool {
        match rule {
            Rule::Required => !current.is_zero(),
            Rule::RequiredWith(sibling) => {
                let sibling_set = self
                    .fields
                    .iter()
                    .find(|f| f.name == sibling)
                    .is_some_and(|f| !(f.accessor)(value).is_zero());
                !sibling_set || !current.is_zero()
            }
            Rule::GreaterThan(threshold) => current.magnitude() > threshold,
        }
    }
}

impl<T> fmt::Debug for Ruleset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ruleset")
            .field("shape", &self.shape)
            .field("fields", &self.fields.iter().map(|fl| fl.name).collect::<Vec<_>>())
            .finish()
    }
}

/// The first rule a value broke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    shape: &'static str,
    field: &'static str,
    rule: Rule,
}

impl Violation {
    /// The offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The broken rule.
    #[must_use]
    pub fn rule(&self) -> Rule {
        self.rule
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key: '{}.{}' Error:Field validation for '{}' failed on the '{}' tag",
            self.shape,
            self.field,
            self.field,
            self.rule.tag()
        )
    }
}

impl std::error::Error for Violation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Plan {
        rate: f64,
        contributions: f64,
        period: f64,
        label: Option<String>,
    }

    fn rules() -> Ruleset<Plan> {
        Ruleset::new("Plan")
            .field("Rate", |p: &Plan| FieldValue::Number(p.rate), &[Rule::Required])
            .field("Contributions", |p: &Plan| FieldValue::Number(p.contributions), &[])
            .field(
                "Period",
                |p: &Plan| FieldValue::Number(p.period),
                &[Rule::GreaterThan(0.0), Rule::RequiredWith("Contributions")],
            )
    }

    #[test]
    fn test_valid_plan() {
        let plan = Plan {
            rate: 3.0,
            contributions: 10.0,
            period: 12.0,
            label: None,
        };
        assert!(rules().check(&plan).is_ok());
    }

    #[test]
    fn test_first_violation_wins() {
        let violation = rules().check(&Plan::default()).unwrap_err();
        assert_eq!(violation.field(), "Rate");
        assert_eq!(violation.rule(), Rule::Required);
    }

    #[test]
    fn test_greater_than_ignores_presence() {
        let plan = Plan {
            rate: 3.0,
            ..Plan::default()
        };
        let violation = rules().check(&plan).unwrap_err();
        assert_eq!(violation.field(), "Period");
        assert_eq!(violation.rule().tag(), "gt");
    }

    #[test]
    fn test_required_with_only_when_sibling_set() {
        let rules = Ruleset::new("Plan")
            .field("Contributions", |p: &Plan| FieldValue::Number(p.contributions), &[])
            .field(
                "Period",
                |p: &Plan| FieldValue::Number(p.period),
                &[Rule::RequiredWith("Contributions")],
            );

        assert!(rules.check(&Plan::default()).is_ok());

        let plan = Plan {
            contributions: 50.0,
            ..Plan::default()
        };
        let violation = rules.check(&plan).unwrap_err();
        assert_eq!(
            violation.to_string(),
            "Key: 'Plan.Period' Error:Field validation for 'Period' failed on the 'required_with' tag"
        );
    }

    #[test]
    fn test_text_fields() {
        let rules = Ruleset::new("Plan").field(
            "Label",
            |p: &Plan| p.label.as_deref().map_or(FieldValue::Absent, FieldValue::Text),
            &[Rule::Required, Rule::GreaterThan(2.0)],
        );

        assert_eq!(rules.check(&Plan::default()).unwrap_err().rule(), Rule::Required);

        let short = Plan {
            label: Some("ab".to_string()),
            ..Plan::default()
        };
        assert_eq!(rules.check(&short).unwrap_err().rule().tag(), "gt");

        let long = Plan {
            label: Some("abc".to_string()),
            ..Plan::default()
        };
        assert!(rules.check(&long).is_ok());
    }

    #[test]
    fn test_none_accepts_everything() {
        let rules = Ruleset::<Plan>::none();
        assert!(rules.is_empty());
        assert!(rules.check(&Plan::default()).is_ok());
    }
}
