//! Per-run configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, FixedClock, SystemClock};

/// Offending rows shown per assertion in the text report.
pub const DEFAULT_MAX_ROWS_SHOWN: usize = 10;

/// Configuration for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Snapshot date to use for `current_date`; wall-clock UTC when unset
    #[serde(default)]
    pub as_of: Option<NaiveDate>,

    /// Rows listed per failed assertion in the text report
    #[serde(default = "default_max_rows_shown")]
    pub max_rows_shown: usize,
}

fn default_max_rows_shown() -> usize {
    DEFAULT_MAX_ROWS_SHOWN
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            as_of: None,
            max_rows_shown: DEFAULT_MAX_ROWS_SHOWN,
        }
    }
}

impl RunConfig {
    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    pub fn with_max_rows_shown(mut self, rows: usize) -> Self {
        self.max_rows_shown = rows;
        self
    }

    /// The clock this run evaluates `current_date` with.
    pub fn clock(&self) -> Box<dyn Clock> {
        match self.as_of {
            Some(date) => Box::new(FixedClock::new(date)),
            None => Box::new(SystemClock),
        }
    }
}
