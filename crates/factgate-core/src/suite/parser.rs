//! Suite parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::predicates::{PredicateSpec, UpperBound};
use crate::reference::DatasetReference;
use crate::types::Severity;

use super::schema::validate_suite_schema;

/// Errors that can occur when loading suites.
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Failed to read suite file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Suite does not match schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("Suite validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// A named predicate over one dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assertion {
    /// Unique name within the suite (e.g., "assert_order_date_in_range")
    pub name: String,

    /// Target dataset
    pub dataset: DatasetReference,

    pub predicate: PredicateSpec,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub description: Option<String>,
}

/// A set of assertions evaluated together as one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    /// Version of this suite (semver)
    pub suite_version: String,

    /// Version of the suite schema (date-based)
    pub schema_version: String,

    /// Human-readable name
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub assertions: Vec<Assertion>,
}

impl Suite {
    /// Parse a suite from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SuiteError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a suite from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SuiteError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a suite from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SuiteError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a suite from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SuiteError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a suite file, choosing the format by extension (`.json` is
    /// JSON, anything else is YAML).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SuiteError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_yaml_file(path),
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, SuiteError> {
        validate_suite_schema(&value).map_err(SuiteError::SchemaViolation)?;
        let suite: Suite = serde_json::from_value(value.clone())
            .map_err(|e| SuiteError::ValidationError(locate_field_error(&value, e)))?;
        suite.validate()?;
        Ok(suite)
    }

    /// Validate the suite structure.
    fn validate(&self) -> Result<(), SuiteError> {
        if self.name.trim().is_empty() {
            return Err(SuiteError::MissingField("name".to_string()));
        }

        if self.assertions.is_empty() {
            return Err(SuiteError::MissingField("assertions".to_string()));
        }

        self.validate_unique_names()?;
        self.validate_fixed_bounds()?;

        Ok(())
    }

    /// Ensure assertion names are unique.
    fn validate_unique_names(&self) -> Result<(), SuiteError> {
        let mut seen = HashSet::new();

        for assertion in &self.assertions {
            if !seen.insert(assertion.name.as_str()) {
                return Err(SuiteError::ValidationError(format!(
                    "Duplicate assertion name: {}",
                    assertion.name
                )));
            }
        }

        Ok(())
    }

    /// Reject bounds that are inverted regardless of the evaluation date.
    fn validate_fixed_bounds(&self) -> Result<(), SuiteError> {
        for assertion in &self.assertions {
            if let PredicateSpec::DateBounds(bounds) = &assertion.predicate {
                if let UpperBound::Fixed(upper) = bounds.upper_bound {
                    if bounds.lower_bound > upper {
                        return Err(SuiteError::ValidationError(format!(
                            "Assertion {}: lower_bound {} is after upper_bound {}",
                            assertion.name, bounds.lower_bound, upper
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Find an assertion by name.
    pub fn assertion(&self, name: &str) -> Option<&Assertion> {
        self.assertions.iter().find(|a| a.name == name)
    }

    /// Distinct datasets the suite reads, in first-use order.
    pub fn datasets(&self) -> Vec<&DatasetReference> {
        let mut seen = HashSet::new();
        self.assertions
            .iter()
            .map(|a| &a.dataset)
            .filter(|d| seen.insert(d.name()))
            .collect()
    }
}

/// Name the assertion a field error came from. Schema validation has already
/// passed, so the failure is in a value the schema can't check (a reference
/// or a calendar date).
fn locate_field_error(value: &serde_json::Value, err: serde_json::Error) -> String {
    let assertions = value
        .get("assertions")
        .and_then(|a| a.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (index, item) in assertions.iter().enumerate() {
        if let Err(e) = Assertion::deserialize(item) {
            let name = item
                .get("name")
                .and_then(|n| n.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", index + 1));
            return format!("Assertion {}: {}", name, e);
        }
    }

    err.to_string()
}
