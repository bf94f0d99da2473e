//! Human-readable rendering of run reports.

use std::fmt::Write;

use crate::types::{AssertionOutcome, AssertionResult, RunReport, RunStatus, Severity};

impl RunReport {
    /// Render the report as text, listing at most `max_rows` offending
    /// rows per assertion.
    pub fn render_text(&self, max_rows: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Suite \"{}\" evaluated on {}",
            self.suite, self.evaluated_on
        );

        let width = self
            .results
            .iter()
            .map(|r| r.name.len())
            .max()
            .unwrap_or(0);

        for result in &self.results {
            render_result(&mut out, result, width, max_rows);
        }

        out.push_str(&self.build_summary());
        out.push('\n');
        out
    }

    /// One-line summary (e.g., "Result: FAILED (1 failed, 0 errored, 2 passed, 0 warned)").
    pub fn build_summary(&self) -> String {
        let status = match self.status {
            RunStatus::Clean => "CLEAN",
            RunStatus::Failed => "FAILED",
        };
        format!(
            "Result: {} ({} failed, {} errored, {} passed, {} warned)",
            status,
            self.failed(),
            self.errored(),
            self.passed(),
            self.warned()
        )
    }
}

fn status_label(result: &AssertionResult) -> &'static str {
    match (&result.outcome, result.severity) {
        (AssertionOutcome::Pass, _) => "PASS",
        (AssertionOutcome::Fail { .. }, Severity::Error) => "FAIL",
        (AssertionOutcome::Fail { .. }, Severity::Warn) => "WARN",
        (AssertionOutcome::Error { .. }, _) => "ERROR",
    }
}

fn render_result(out: &mut String, result: &AssertionResult, width: usize, max_rows: usize) {
    let target = result.location.as_deref().unwrap_or(&result.dataset);
    let _ = write!(
        out,
        "  {:<5} {:<width$}  {} on {}",
        status_label(result),
        result.name,
        result.predicate,
        target,
        width = width
    );

    match &result.outcome {
        AssertionOutcome::Pass => out.push('\n'),
        AssertionOutcome::Fail { offending_rows } => {
            let _ = writeln!(out, ": {} offending row(s)", offending_rows.len());
            for row in offending_rows.iter().take(max_rows) {
                let _ = writeln!(
                    out,
                    "        {}: {} {}",
                    row.pointer(&result.dataset),
                    row.reason,
                    serde_json::to_string(&row.row).unwrap_or_default()
                );
            }
            if offending_rows.len() > max_rows {
                let _ = writeln!(out, "        ... and {} more", offending_rows.len() - max_rows);
            }
        }
        AssertionOutcome::Error { kind, message } => {
            let _ = writeln!(out, ": {}: {}", kind, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FactRow;
    use crate::evidence::OffendingRow;
    use crate::predicates::PredicateKind;
    use crate::types::ErrorKind;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    fn offending(n: usize) -> Vec<OffendingRow> {
        (0..n)
            .map(|i| {
                OffendingRow::new(
                    i,
                    "order_date",
                    "order_date 1989-12-31 is before 1990-01-01",
                    FactRow::from_value(json!({ "order_key": i, "order_date": "1989-12-31" }))
                        .unwrap(),
                )
            })
            .collect()
    }

    fn report(outcomes: Vec<(Severity, AssertionOutcome)>, status: RunStatus) -> RunReport {
        RunReport {
            suite: "fct_orders quality".to_string(),
            evaluated_on: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            evaluated_at: Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap(),
            status,
            results: outcomes
                .into_iter()
                .enumerate()
                .map(|(i, (severity, outcome))| AssertionResult {
                    name: format!("assertion_{}", i),
                    dataset: "fct_orders".to_string(),
                    location: Some("analytics.fct_orders".to_string()),
                    predicate: PredicateKind::DateBounds,
                    severity,
                    outcome,
                })
                .collect(),
        }
    }

    #[test]
    fn test_clean_summary() {
        let report = report(vec![(Severity::Error, AssertionOutcome::Pass)], RunStatus::Clean);
        let text = report.render_text(10);
        assert!(text.contains("PASS"));
        assert!(text.ends_with("Result: CLEAN (0 failed, 0 errored, 1 passed, 0 warned)\n"));
    }

    #[test]
    fn test_failed_rows_are_capped() {
        let report = report(
            vec![(
                Severity::Error,
                AssertionOutcome::Fail {
                    offending_rows: offending(5),
                },
            )],
            RunStatus::Failed,
        );
        let text = report.render_text(2);

        assert!(text.contains("FAIL  assertion_0  date_bounds on analytics.fct_orders: 5 offending row(s)"));
        assert!(text.contains("fct_orders[0].order_date"));
        assert!(text.contains("fct_orders[1].order_date"));
        assert!(!text.contains("fct_orders[2].order_date"));
        assert!(text.contains("... and 3 more"));
    }

    #[test]
    fn test_warn_and_error_labels() {
        let report = report(
            vec![
                (
                    Severity::Warn,
                    AssertionOutcome::Fail {
                        offending_rows: offending(1),
                    },
                ),
                (
                    Severity::Error,
                    AssertionOutcome::Error {
                        kind: ErrorKind::DatasetUnavailable,
                        message: "Dataset unavailable: fct_orders: not materialized".to_string(),
                    },
                ),
            ],
            RunStatus::Failed,
        );
        let text = report.render_text(10);

        assert!(text.contains("WARN "));
        assert!(text.contains("ERROR"));
        assert!(text.contains("DatasetUnavailable: Dataset unavailable"));
        assert!(text.contains("(0 failed, 1 errored, 0 passed, 1 warned)"));
    }
}
