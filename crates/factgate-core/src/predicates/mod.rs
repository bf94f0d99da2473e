//! Row predicates.
//!
//! Each predicate selects the rows that violate it. An assertion passes
//! when its predicate selects nothing.
//!
//! Predicates come in two forms:
//! - `PredicateSpec`: as declared in a suite, possibly relative to the
//!   evaluation date (`upper_bound: current_date`)
//! - `Predicate`: bound to a concrete evaluation date, ready to run

mod date_bounds;
mod not_null;
mod unique;

pub use date_bounds::{offending_rows, DateBounds};
pub use not_null::NotNull;
pub use unique::Unique;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::FactRow;
use crate::evidence::OffendingRow;
use crate::EvaluationError;

/// Column inspected by `date_bounds` when none is given.
pub const DEFAULT_DATE_COLUMN: &str = "order_date";

/// Identifies which predicate an assertion uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    DateBounds,
    NotNull,
    Unique,
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateBounds => f.write_str("date_bounds"),
            Self::NotNull => f.write_str("not_null"),
            Self::Unique => f.write_str("unique"),
        }
    }
}

/// Trait implemented by every bound predicate.
pub trait RowPredicate {
    fn kind(&self) -> PredicateKind;

    /// The column the predicate inspects.
    fn column(&self) -> &str;

    /// Select the violating rows of `dataset`, in dataset order.
    fn offending_rows(
        &self,
        dataset: &str,
        rows: &[FactRow],
    ) -> Result<Vec<OffendingRow>, EvaluationError>;
}

/// Upper bound of a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UpperBound {
    /// The evaluation date of the run
    #[default]
    CurrentDate,
    /// A fixed snapshot date
    Fixed(NaiveDate),
}

impl UpperBound {
    pub const CURRENT_DATE: &'static str = "current_date";

    /// The concrete date for an evaluation on `today`.
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::CurrentDate => today,
            Self::Fixed(date) => *date,
        }
    }
}

impl TryFrom<String> for UpperBound {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == Self::CURRENT_DATE {
            return Ok(Self::CurrentDate);
        }
        NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map(Self::Fixed)
            .map_err(|_| {
                format!(
                    "upper_bound must be '{}' or a YYYY-MM-DD date, got '{}'",
                    Self::CURRENT_DATE,
                    value
                )
            })
    }
}

impl From<UpperBound> for String {
    fn from(bound: UpperBound) -> Self {
        match bound {
            UpperBound::CurrentDate => UpperBound::CURRENT_DATE.to_string(),
            UpperBound::Fixed(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

fn default_date_column() -> String {
    DEFAULT_DATE_COLUMN.to_string()
}

/// Declared form of a `date_bounds` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateBoundsSpec {
    #[serde(default = "default_date_column")]
    pub column: String,

    /// Inclusive lower bound
    pub lower_bound: NaiveDate,

    /// Inclusive upper bound
    #[serde(default)]
    pub upper_bound: UpperBound,
}

/// Declared form of a single-column predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub column: String,
}

/// A predicate as declared in a suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateSpec {
    /// Flags rows whose date falls outside `[lower_bound, upper_bound]`
    DateBounds(DateBoundsSpec),

    /// Flags rows where the column is missing or null
    NotNull(ColumnSpec),

    /// Flags rows whose value occurs more than once
    Unique(ColumnSpec),
}

impl PredicateSpec {
    pub fn kind(&self) -> PredicateKind {
        match self {
            Self::DateBounds(_) => PredicateKind::DateBounds,
            Self::NotNull(_) => PredicateKind::NotNull,
            Self::Unique(_) => PredicateKind::Unique,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Self::DateBounds(spec) => &spec.column,
            Self::NotNull(spec) | Self::Unique(spec) => &spec.column,
        }
    }

    /// Bind to an evaluation date.
    ///
    /// Fails with `QueryExecution` when the bounds are inverted on `today`.
    pub fn bind(&self, today: NaiveDate) -> Result<Predicate, EvaluationError> {
        match self {
            Self::DateBounds(spec) => DateBounds::new(
                spec.column.clone(),
                spec.lower_bound,
                spec.upper_bound.resolve(today),
            )
            .map(Predicate::DateBounds),
            Self::NotNull(spec) => Ok(Predicate::NotNull(NotNull::new(spec.column.clone()))),
            Self::Unique(spec) => Ok(Predicate::Unique(Unique::new(spec.column.clone()))),
        }
    }
}

/// A predicate bound to a concrete evaluation date.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    DateBounds(DateBounds),
    NotNull(NotNull),
    Unique(Unique),
}

impl RowPredicate for Predicate {
    fn kind(&self) -> PredicateKind {
        match self {
            Self::DateBounds(p) => p.kind(),
            Self::NotNull(p) => p.kind(),
            Self::Unique(p) => p.kind(),
        }
    }

    fn column(&self) -> &str {
        match self {
            Self::DateBounds(p) => p.column(),
            Self::NotNull(p) => p.column(),
            Self::Unique(p) => p.column(),
        }
    }

    fn offending_rows(
        &self,
        dataset: &str,
        rows: &[FactRow],
    ) -> Result<Vec<OffendingRow>, EvaluationError> {
        match self {
            Self::DateBounds(p) => p.offending_rows(dataset, rows),
            Self::NotNull(p) => p.offending_rows(dataset, rows),
            Self::Unique(p) => p.offending_rows(dataset, rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_upper_bound_parsing() {
        assert_eq!(
            UpperBound::try_from("current_date".to_string()),
            Ok(UpperBound::CurrentDate)
        );
        assert_eq!(
            UpperBound::try_from("2024-12-31".to_string()),
            Ok(UpperBound::Fixed(day("2024-12-31")))
        );
        assert!(UpperBound::try_from("tomorrow".to_string()).is_err());
    }

    #[test]
    fn test_date_bounds_spec_defaults() {
        let spec: PredicateSpec =
            serde_json::from_str(r#"{ "date_bounds": { "lower_bound": "1990-01-01" } }"#).unwrap();

        match &spec {
            PredicateSpec::DateBounds(bounds) => {
                assert_eq!(bounds.column, DEFAULT_DATE_COLUMN);
                assert_eq!(bounds.upper_bound, UpperBound::CurrentDate);
            }
            other => panic!("unexpected spec: {other:?}"),
        }
        assert_eq!(spec.kind(), PredicateKind::DateBounds);
    }

    #[test]
    fn test_bind_resolves_current_date() {
        let spec: PredicateSpec =
            serde_json::from_str(r#"{ "date_bounds": { "lower_bound": "1990-01-01" } }"#).unwrap();

        match spec.bind(day("2026-10-14")).unwrap() {
            Predicate::DateBounds(bounds) => {
                assert_eq!(bounds.upper(), day("2026-10-14"));
                assert_eq!(bounds.lower(), day("1990-01-01"));
            }
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn test_bind_keeps_fixed_snapshot() {
        let spec: PredicateSpec = serde_json::from_str(
            r#"{ "date_bounds": { "lower_bound": "1990-01-01", "upper_bound": "2024-12-31" } }"#,
        )
        .unwrap();

        match spec.bind(day("2026-10-14")).unwrap() {
            Predicate::DateBounds(bounds) => assert_eq!(bounds.upper(), day("2024-12-31")),
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn test_bind_fails_when_today_precedes_lower_bound() {
        let spec: PredicateSpec =
            serde_json::from_str(r#"{ "date_bounds": { "lower_bound": "2030-01-01" } }"#).unwrap();
        assert!(matches!(
            spec.bind(day("2026-10-14")),
            Err(EvaluationError::QueryExecution(_))
        ));
    }

    #[test]
    fn test_column_predicates_deserialize() {
        let spec: PredicateSpec =
            serde_json::from_str(r#"{ "not_null": { "column": "order_key" } }"#).unwrap();
        assert_eq!(spec.kind(), PredicateKind::NotNull);
        assert_eq!(spec.column(), "order_key");

        let spec: PredicateSpec =
            serde_json::from_str(r#"{ "unique": { "column": "order_key" } }"#).unwrap();
        assert_eq!(spec.kind(), PredicateKind::Unique);
    }
}
