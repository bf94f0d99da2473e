//! Uniqueness predicate.
//!
//! **Selects**: every row whose non-null value in the column also appears in
//! another row. Nulls and absent values are never duplicates. Numbers compare
//! by value, so `1` and `1.0` are the same key, as in a SQL `group by`.

use serde_json::Value;
use std::collections::HashMap;

use crate::dataset::FactRow;
use crate::evidence::OffendingRow;
use crate::EvaluationError;

use super::{PredicateKind, RowPredicate};

#[derive(Debug, Clone, PartialEq)]
pub struct Unique {
    column: String,
}

impl Unique {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    fn key(&self, row: &FactRow) -> Option<String> {
        match row.get(&self.column) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(number_key(n)),
            Some(value) => Some(value.to_string()),
        }
    }
}

/// Canonical text for a number: integral values print without a fraction.
fn number_key(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

impl RowPredicate for Unique {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Unique
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn offending_rows(
        &self,
        _dataset: &str,
        rows: &[FactRow],
    ) -> Result<Vec<OffendingRow>, EvaluationError> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for key in rows.iter().filter_map(|row| self.key(row)) {
            *counts.entry(key).or_insert(0) += 1;
        }

        let offending = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let key = self.key(row)?;
                let count = counts.get(&key).copied().unwrap_or(0);
                (count > 1).then(|| {
                    OffendingRow::new(
                        index,
                        &self.column,
                        format!("{} {} appears {} times", self.column, key, count),
                        row.clone(),
                    )
                })
            })
            .collect();

        Ok(offending)
    }
}
