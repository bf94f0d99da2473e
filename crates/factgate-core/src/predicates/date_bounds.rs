//! Date bounds predicate.
//!
//! **Selects**: rows whose date-truncated value is strictly before the lower
//! bound or strictly after the upper bound. Both bounds are inclusive for
//! valid rows.

use chrono::NaiveDate;

use crate::dataset::FactRow;
use crate::dates::truncate_to_date;
use crate::evidence::OffendingRow;
use crate::EvaluationError;

use super::{PredicateKind, RowPredicate};

/// A `[lower, upper]` date range over one column.
#[derive(Debug, Clone, PartialEq)]
pub struct DateBounds {
    column: String,
    lower: NaiveDate,
    upper: NaiveDate,
}

impl DateBounds {
    /// Fails with `QueryExecution` when `lower > upper`.
    pub fn new(
        column: impl Into<String>,
        lower: NaiveDate,
        upper: NaiveDate,
    ) -> Result<Self, EvaluationError> {
        if lower > upper {
            return Err(EvaluationError::query(format!(
                "date bounds are inverted: lower bound {} is after upper bound {}",
                lower, upper
            )));
        }

        Ok(Self {
            column: column.into(),
            lower,
            upper,
        })
    }

    pub fn lower(&self) -> NaiveDate {
        self.lower
    }

    pub fn upper(&self) -> NaiveDate {
        self.upper
    }
}

impl RowPredicate for DateBounds {
    fn kind(&self) -> PredicateKind {
        PredicateKind::DateBounds
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn offending_rows(
        &self,
        dataset: &str,
        rows: &[FactRow],
    ) -> Result<Vec<OffendingRow>, EvaluationError> {
        offending_rows(rows, &self.column, self.lower, self.upper).map_err(|e| match e {
            EvaluationError::QueryExecution(message) => {
                EvaluationError::query(format!("{}: {}", dataset, message))
            }
            other => other,
        })
    }
}

/// Select the rows whose `column`, truncated to a date, lies outside
/// `[lower, upper]`.
///
/// A row whose value cannot be truncated to a date aborts the evaluation,
/// the same way a failing `DATE()` cast aborts a warehouse query.
pub fn offending_rows(
    rows: &[FactRow],
    column: &str,
    lower: NaiveDate,
    upper: NaiveDate,
) -> Result<Vec<OffendingRow>, EvaluationError> {
    let mut offending = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let date = truncate_to_date(row.get(column)).map_err(|reason| {
            EvaluationError::query(format!(
                "cannot evaluate date({}) for row {}: {}",
                column, index, reason
            ))
        })?;

        let reason = if date < lower {
            format!("{} {} is before {}", column, date, lower)
        } else if date > upper {
            format!("{} {} is after {}", column, date, upper)
        } else {
            continue;
        };

        offending.push(OffendingRow::new(index, column, reason, row.clone()));
    }

    Ok(offending)
}
