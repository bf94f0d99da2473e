//! Evidence for failed assertions.
//!
//! Every row a predicate selects is reported with its position in the
//! dataset and the reason it was selected, so a failed run can be diagnosed
//! without re-querying the warehouse.

use serde::{Deserialize, Serialize};

use crate::dataset::FactRow;

/// A row selected by a predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OffendingRow {
    /// Zero-based position in the dataset as loaded
    pub row_index: usize,

    /// Column the predicate inspected
    pub column: String,

    /// Why the row was selected
    pub reason: String,

    /// The row itself
    pub row: FactRow,
}

impl OffendingRow {
    pub fn new(
        row_index: usize,
        column: impl Into<String>,
        reason: impl Into<String>,
        row: FactRow,
    ) -> Self {
        Self {
            row_index,
            column: column.into(),
            reason: reason.into(),
            row,
        }
    }

    /// Pointer to the offending value (e.g., "fct_orders[3].order_date").
    pub fn pointer(&self, dataset: &str) -> String {
        format!("{}[{}].{}", dataset, self.row_index, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_names_dataset_row_and_column() {
        let row = FactRow::from_value(json!({ "order_date": "1989-12-31" })).unwrap();
        let offending = OffendingRow::new(3, "order_date", "before 1990-01-01", row);
        assert_eq!(offending.pointer("fct_orders"), "fct_orders[3].order_date");
    }

    #[test]
    fn test_serializes_row_inline() {
        let row = FactRow::from_value(json!({ "order_key": 7, "order_date": "1989-12-31" })).unwrap();
        let offending = OffendingRow::new(0, "order_date", "before 1990-01-01", row);
        let value = serde_json::to_value(&offending).unwrap();
        assert_eq!(value["row"]["order_key"], json!(7));
        assert_eq!(value["row_index"], json!(0));
    }
}
