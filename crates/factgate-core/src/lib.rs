//! # factgate-core
//!
//! Deterministic data-quality assertion engine for materialized datasets.
//!
//! A suite declares named predicates over datasets produced by an upstream
//! transformation step. Each predicate selects the rows that violate it:
//! - zero rows selected: the assertion passes
//! - one or more rows selected: the assertion fails, and the rows are the detail
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same dataset and evaluation date always produce the same rows
//! 2. **Read-only**: Datasets are loaded, never mutated
//! 3. **Traceable**: Every offending row carries its position and the reason it was selected
//! 4. **Single pass**: One synchronous evaluation per assertion, no retries
//!
//! ## Example
//!
//! ```rust,ignore
//! use factgate_core::{AssertionRunner, DirectorySource, Suite, SystemClock};
//!
//! let suite = Suite::from_path("assertions.yaml")?;
//! let source = DirectorySource::new("target/materialized");
//! let report = AssertionRunner::new(&source, &SystemClock).run(&suite);
//!
//! if !report.is_clean() {
//!     eprintln!("{}", report.render_text(10));
//!     std::process::exit(1);
//! }
//! ```

pub mod clock;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod evidence;
pub mod predicates;
pub mod reference;
pub mod report;
pub mod runner;
pub mod sql;
pub mod suite;
pub mod types;

// Re-export main types at crate root
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::RunConfig;
pub use dataset::{DatasetSource, DirectorySource, FactRow, InMemorySource, ResolvedDataset};
pub use evidence::OffendingRow;
pub use predicates::{
    offending_rows, DateBounds, NotNull, Predicate, PredicateKind, PredicateSpec, RowPredicate,
    Unique, UpperBound, DEFAULT_DATE_COLUMN,
};
pub use reference::{DatasetReference, ReferenceError};
pub use runner::AssertionRunner;
pub use sql::compile_sql;
pub use suite::{Assertion, Suite, SuiteError};
pub use types::{AssertionOutcome, AssertionResult, ErrorKind, RunReport, RunStatus, Severity};

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while evaluating an assertion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Dataset unavailable: {reference}: {reason}")]
    DatasetUnavailable { reference: String, reason: String },

    #[error("Query execution failed: {0}")]
    QueryExecution(String),
}

impl EvaluationError {
    pub fn unavailable(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DatasetUnavailable {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryExecution(message.into())
    }

    /// The reportable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DatasetUnavailable { .. } => ErrorKind::DatasetUnavailable,
            Self::QueryExecution(_) => ErrorKind::QueryExecutionError,
        }
    }
}

/// Select the rows of `reference` whose `order_date` falls outside
/// `[lower_bound, upper_bound]`.
///
/// This is the main entry point for a one-off date bounds check. Callers
/// normally pass the evaluation date (`Clock::today`) as `upper_bound`.
///
/// # Errors
///
/// * `DatasetUnavailable` - the reference does not resolve to a materialized dataset
/// * `QueryExecution` - the bounds are inverted, or a row's date cannot be evaluated
pub fn evaluate_date_bounds(
    source: &dyn DatasetSource,
    reference: &DatasetReference,
    lower_bound: NaiveDate,
    upper_bound: NaiveDate,
) -> Result<Vec<OffendingRow>, EvaluationError> {
    let predicate = DateBounds::new(DEFAULT_DATE_COLUMN, lower_bound, upper_bound)?;
    let resolved = source.resolve(reference)?;
    let rows = source.load(&resolved)?;

    tracing::debug!(
        dataset = %resolved.location,
        rows = rows.len(),
        lower = %lower_bound,
        upper = %upper_bound,
        "Evaluating date bounds"
    );

    predicate.offending_rows(reference.name(), &rows)
}
