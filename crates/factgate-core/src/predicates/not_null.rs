//! Not-null predicate.
//!
//! **Selects**: rows where the column is absent or null.

use serde_json::Value;

use crate::dataset::FactRow;
use crate::evidence::OffendingRow;
use crate::EvaluationError;

use super::{PredicateKind, RowPredicate};

#[derive(Debug, Clone, PartialEq)]
pub struct NotNull {
    column: String,
}

impl NotNull {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl RowPredicate for NotNull {
    fn kind(&self) -> PredicateKind {
        PredicateKind::NotNull
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn offending_rows(
        &self,
        _dataset: &str,
        rows: &[FactRow],
    ) -> Result<Vec<OffendingRow>, EvaluationError> {
        let offending = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let reason = match row.get(&self.column) {
                    None => format!("{} is missing", self.column),
                    Some(Value::Null) => format!("{} is null", self.column),
                    Some(_) => return None,
                };
                Some(OffendingRow::new(index, &self.column, reason, row.clone()))
            })
            .collect();

        Ok(offending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flags_missing_and_null() {
        let rows: Vec<FactRow> = [
            json!({ "order_key": 1 }),
            json!({ "order_key": null }),
            json!({ "customer_key": 3 }),
            json!({ "order_key": 0 }),
        ]
        .into_iter()
        .filter_map(FactRow::from_value)
        .collect();

        let offending = NotNull::new("order_key")
            .offending_rows("fct_orders", &rows)
            .unwrap();
        let indices: Vec<usize> = offending.iter().map(|r| r.row_index).collect();

        assert_eq!(indices, vec![1, 2]);
        assert_eq!(offending[0].reason, "order_key is null");
        assert_eq!(offending[1].reason, "order_key is missing");
    }
}
