//! Assertion suite parsing and validation.
//!
//! Suites are structured data validated against JSON Schema.
//! This module handles parsing YAML/JSON suites and validating them.

mod parser;
mod schema;

pub use parser::{Assertion, Suite, SuiteError};
pub use schema::validate_suite_schema;
