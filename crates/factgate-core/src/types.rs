//! Result types shared by the runner and the report renderers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::evidence::OffendingRow;
use crate::predicates::PredicateKind;

/// How a failing assertion affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A failure fails the run
    #[default]
    Error,
    /// A failure is reported but the run stays clean
    Warn,
}

/// Reportable error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    DatasetUnavailable,
    QueryExecutionError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatasetUnavailable => f.write_str("DatasetUnavailable"),
            Self::QueryExecutionError => f.write_str("QueryExecutionError"),
        }
    }
}

/// Outcome of evaluating a single assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssertionOutcome {
    /// The predicate selected zero rows
    Pass,

    /// The predicate selected one or more rows
    Fail { offending_rows: Vec<OffendingRow> },

    /// The predicate could not be evaluated
    Error { kind: ErrorKind, message: String },
}

impl AssertionOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Rows selected by the predicate; empty unless the outcome is `Fail`.
    pub fn offending_rows(&self) -> &[OffendingRow] {
        match self {
            Self::Fail { offending_rows } => offending_rows,
            _ => &[],
        }
    }
}

/// Result for one assertion within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    /// Assertion name from the suite
    pub name: String,

    /// Dataset name the assertion targets
    pub dataset: String,

    /// Where the dataset resolved to, if it resolved
    pub location: Option<String>,

    pub predicate: PredicateKind,

    pub severity: Severity,

    #[serde(flatten)]
    pub outcome: AssertionOutcome,
}

impl AssertionResult {
    /// Whether this result fails the run.
    pub fn fails_run(&self) -> bool {
        match &self.outcome {
            AssertionOutcome::Pass => false,
            AssertionOutcome::Fail { .. } => self.severity == Severity::Error,
            AssertionOutcome::Error { .. } => true,
        }
    }
}

/// Overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Clean,
    Failed,
}

/// Complete result of running a suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Suite name
    pub suite: String,

    /// The date `current_date` resolved to for this run
    pub evaluated_on: NaiveDate,

    /// When the run started
    pub evaluated_at: DateTime<Utc>,

    pub status: RunStatus,

    pub results: Vec<AssertionResult>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.status == RunStatus::Clean
    }

    /// Count of results that passed.
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_pass()).count()
    }

    /// Count of error-severity failures.
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.is_fail() && r.severity == Severity::Error)
            .count()
    }

    /// Count of warn-severity failures.
    pub fn warned(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.is_fail() && r.severity == Severity::Warn)
            .count()
    }

    /// Count of assertions that could not be evaluated.
    pub fn errored(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_error()).count()
    }
}
