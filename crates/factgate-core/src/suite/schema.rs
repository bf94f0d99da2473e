//! JSON Schema validation for suites.
//!
//! Suites are validated against schema/suite.schema.json before they are
//! deserialized, so shape errors are reported with their instance paths.

use std::sync::OnceLock;

/// Embedded suite schema (loaded at compile time).
const SUITE_SCHEMA_JSON: &str = include_str!("../../../../schema/suite.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, String> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(SUITE_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result.as_ref().map_err(Clone::clone)
}

/// Validate a suite JSON value against the schema.
///
/// Returns `Err` with one message per violation.
pub fn validate_suite_schema(suite_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e])?;

    let errors: Vec<String> = validator
        .iter_errors(suite_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> serde_json::Value {
        json!({
            "suite_version": "1.0",
            "schema_version": "2026-01-15",
            "name": "fct_orders quality",
            "assertions": [
                {
                    "name": "assert_order_date_in_range",
                    "dataset": "{{ ref('fct_orders') }}",
                    "predicate": {
                        "date_bounds": { "lower_bound": "1990-01-01" }
                    }
                }
            ]
        })
    }

    #[test]
    fn test_minimal_suite_passes_schema() {
        assert!(validate_suite_schema(&minimal()).is_ok());
    }

    #[test]
    fn test_empty_assertions_fail() {
        let mut value = minimal();
        value["assertions"] = json!([]);
        assert!(validate_suite_schema(&value).is_err());
    }

    #[test]
    fn test_invalid_version_format_fails() {
        let mut value = minimal();
        value["suite_version"] = json!("one");
        assert!(validate_suite_schema(&value).is_err());
    }

    #[test]
    fn test_assertion_name_pattern_enforced() {
        let mut value = minimal();
        value["assertions"][0]["name"] = json!("Order Date Check");
        let errors = validate_suite_schema(&value).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("/assertions/0/name")));
    }

    #[test]
    fn test_two_predicates_fail() {
        let mut value = minimal();
        value["assertions"][0]["predicate"]["not_null"] = json!({ "column": "order_key" });
        assert!(validate_suite_schema(&value).is_err());
    }

    #[test]
    fn test_unknown_upper_bound_keyword_fails() {
        let mut value = minimal();
        value["assertions"][0]["predicate"]["date_bounds"]["upper_bound"] = json!("now");
        assert!(validate_suite_schema(&value).is_err());
    }

    #[test]
    fn test_additional_properties_fail() {
        let mut value = minimal();
        value["owner"] = json!("analytics");
        assert!(validate_suite_schema(&value).is_err());
    }

    #[test]
    fn test_full_suite_passes_schema() {
        let value = json!({
            "suite_version": "1.2.0",
            "schema_version": "2026-01-15",
            "name": "fct_orders quality",
            "description": "Checks on the derived order fact table",
            "assertions": [
                {
                    "name": "assert_order_date_in_range",
                    "dataset": "{{ ref('fct_orders') }}",
                    "description": "Orders are dated between 1990 and today",
                    "severity": "error",
                    "predicate": {
                        "date_bounds": {
                            "column": "order_date",
                            "lower_bound": "1990-01-01",
                            "upper_bound": "current_date"
                        }
                    }
                },
                {
                    "name": "order_key_not_null",
                    "dataset": "fct_orders",
                    "predicate": { "not_null": { "column": "order_key" } }
                },
                {
                    "name": "order_key_unique",
                    "dataset": "fct_orders",
                    "severity": "warn",
                    "predicate": { "unique": { "column": "order_key" } }
                }
            ]
        });
        assert!(validate_suite_schema(&value).is_ok());
    }
}
