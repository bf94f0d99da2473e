//! Dataset references.
//!
//! Assertions name their target either directly (`fct_orders`) or through
//! the transformation tool's template form (`{{ ref('fct_orders') }}`).
//! Both resolve to the same dataset name; the physical location is decided
//! later by a `DatasetSource`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

lazy_static! {
    static ref BARE_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    static ref REF_TEMPLATE: Regex = Regex::new(
        r#"^\{\{\s*ref\(\s*(?:'([A-Za-z_][A-Za-z0-9_]*)'|"([A-Za-z_][A-Za-z0-9_]*)")\s*\)\s*\}\}$"#
    ).unwrap();
}

/// Errors from parsing a dataset reference.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("Dataset reference is empty")]
    Empty,

    #[error("Malformed dataset reference: {0}")]
    Malformed(String),
}

/// A named pointer to a materialized dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetReference {
    name: String,
}

impl DatasetReference {
    /// Parse a bare name or a `{{ ref('name') }}` template.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReferenceError::Empty);
        }

        if BARE_NAME.is_match(text) {
            return Ok(Self {
                name: text.to_string(),
            });
        }

        let captures = REF_TEMPLATE
            .captures(text)
            .ok_or_else(|| ReferenceError::Malformed(text.to_string()))?;
        let name = captures
            .get(1)
            .or_else(|| captures.get(2))
            .ok_or_else(|| ReferenceError::Malformed(text.to_string()))?;

        Ok(Self {
            name: name.as_str().to_string(),
        })
    }

    /// The dataset name the reference points at.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DatasetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for DatasetReference {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DatasetReference> for String {
    fn from(reference: DatasetReference) -> Self {
        reference.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name() {
        let reference = DatasetReference::parse("fct_orders").unwrap();
        assert_eq!(reference.name(), "fct_orders");
    }

    #[test]
    fn test_template_forms() {
        for text in [
            "{{ ref('fct_orders') }}",
            "{{ref('fct_orders')}}",
            "{{  ref( \"fct_orders\" )  }}",
            "  {{ ref('fct_orders') }}\n",
        ] {
            let reference = DatasetReference::parse(text).unwrap();
            assert_eq!(reference.name(), "fct_orders", "input: {text:?}");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(DatasetReference::parse("   "), Err(ReferenceError::Empty));
    }

    #[test]
    fn test_rejects_malformed() {
        for text in [
            "fct orders",
            "{{ source('raw', 'orders') }}",
            "{{ ref('fct_orders\") }}",
            "{{ ref('') }}",
            "analytics.fct_orders",
            "1_orders",
        ] {
            assert!(
                matches!(DatasetReference::parse(text), Err(ReferenceError::Malformed(_))),
                "input: {text:?}"
            );
        }
    }

    #[test]
    fn test_deserializes_from_string() {
        let reference: DatasetReference =
            serde_json::from_str(r#""{{ ref('fct_orders') }}""#).unwrap();
        assert_eq!(reference.name(), "fct_orders");
        assert_eq!(serde_json::to_string(&reference).unwrap(), r#""fct_orders""#);
    }
}
