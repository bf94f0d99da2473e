//! Runner: evaluates a suite and aggregates the outcomes into a report.
//!
//! Aggregation follows fixed rules:
//! 1. If ANY assertion cannot be evaluated → the run is FAILED
//! 2. Else if ANY error-severity assertion selects rows → the run is FAILED
//! 3. Else → the run is CLEAN
//!
//! Warn-severity failures are reported but never fail a run.

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::dataset::{DatasetSource, ResolvedDataset};
use crate::evidence::OffendingRow;
use crate::predicates::RowPredicate;
use crate::suite::{Assertion, Suite};
use crate::types::{AssertionOutcome, AssertionResult, RunReport, RunStatus};
use crate::EvaluationError;

/// Evaluates suites against a dataset source.
pub struct AssertionRunner<'a> {
    source: &'a dyn DatasetSource,
    clock: &'a dyn Clock,
}

impl<'a> AssertionRunner<'a> {
    pub fn new(source: &'a dyn DatasetSource, clock: &'a dyn Clock) -> Self {
        Self { source, clock }
    }

    /// Evaluate every assertion of `suite` in declaration order.
    ///
    /// `current_date` is read once, so every assertion in the run shares
    /// the same upper bound. An assertion that errors does not stop the
    /// ones after it.
    pub fn run(&self, suite: &Suite) -> RunReport {
        let evaluated_at = self.clock.now();
        let today = self.clock.today();

        tracing::info!(
            suite = %suite.name,
            assertions = suite.assertions.len(),
            evaluated_on = %today,
            "Starting assertion run"
        );

        let results: Vec<AssertionResult> = suite
            .assertions
            .iter()
            .map(|assertion| self.run_assertion(assertion, today))
            .collect();

        let status = if results.iter().any(AssertionResult::fails_run) {
            RunStatus::Failed
        } else {
            RunStatus::Clean
        };

        let report = RunReport {
            suite: suite.name.clone(),
            evaluated_on: today,
            evaluated_at,
            status,
            results,
        };

        tracing::info!(
            suite = %report.suite,
            status = ?report.status,
            passed = report.passed(),
            failed = report.failed(),
            warned = report.warned(),
            errored = report.errored(),
            "Assertion run finished"
        );

        report
    }

    /// Evaluate a single assertion on `today`.
    pub fn run_assertion(&self, assertion: &Assertion, today: NaiveDate) -> AssertionResult {
        let (location, evaluation) = match self.source.resolve(&assertion.dataset) {
            Ok(resolved) => (
                Some(resolved.location.clone()),
                self.evaluate(assertion, &resolved, today),
            ),
            Err(e) => (None, Err(e)),
        };

        let outcome = match evaluation {
            Ok(rows) if rows.is_empty() => {
                tracing::debug!(assertion = %assertion.name, "Assertion passed");
                AssertionOutcome::Pass
            }
            Ok(rows) => {
                tracing::warn!(
                    assertion = %assertion.name,
                    dataset = %assertion.dataset,
                    rows = rows.len(),
                    severity = ?assertion.severity,
                    "Assertion selected offending rows"
                );
                AssertionOutcome::Fail {
                    offending_rows: rows,
                }
            }
            Err(e) => {
                tracing::error!(
                    assertion = %assertion.name,
                    dataset = %assertion.dataset,
                    error = %e,
                    "Assertion could not be evaluated"
                );
                AssertionOutcome::Error {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        };

        AssertionResult {
            name: assertion.name.clone(),
            dataset: assertion.dataset.name().to_string(),
            location,
            predicate: assertion.predicate.kind(),
            severity: assertion.severity,
            outcome,
        }
    }

    fn evaluate(
        &self,
        assertion: &Assertion,
        resolved: &ResolvedDataset,
        today: NaiveDate,
    ) -> Result<Vec<OffendingRow>, EvaluationError> {
        let predicate = assertion.predicate.bind(today)?;
        let rows = self.source.load(resolved)?;
        tracing::debug!(
            assertion = %assertion.name,
            predicate = %predicate.kind(),
            column = predicate.column(),
            dataset = %resolved.location,
            rows = rows.len(),
            "Evaluating assertion"
        );

        predicate.offending_rows(assertion.dataset.name(), &rows)
    }
}
