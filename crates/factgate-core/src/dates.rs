//! Date truncation for row values.
//!
//! Values are truncated to the calendar date as written. An offset
//! timestamp keeps the date in its own offset, matching a warehouse
//! `DATE(ts)` cast.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Suffix warehouses append when exporting UTC timestamps.
const UTC_SUFFIX: &str = " UTC";

/// Truncate a date or date/time string to its date part.
pub fn parse_date_part(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(text, format) {
            return Some(ts.date_naive());
        }
    }

    let naive = text.strip_suffix(UTC_SUFFIX).unwrap_or(text);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(ts.date());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Truncate a row value to a date, describing why it cannot be when it isn't.
pub fn truncate_to_date(value: Option<&Value>) -> Result<NaiveDate, String> {
    match value {
        None => Err("column is missing".to_string()),
        Some(Value::Null) => Err("value is null".to_string()),
        Some(Value::String(text)) => {
            parse_date_part(text).ok_or_else(|| format!("'{}' is not a date or timestamp", text))
        }
        Some(other) => Err(format!("{} is not a date or timestamp", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_plain_date() {
        assert_eq!(parse_date_part("1990-01-01"), Some(day("1990-01-01")));
    }

    #[test]
    fn test_naive_timestamps() {
        assert_eq!(parse_date_part("2024-06-01 23:59:59"), Some(day("2024-06-01")));
        assert_eq!(parse_date_part("2024-06-01T00:00:00.125"), Some(day("2024-06-01")));
    }

    #[test]
    fn test_offset_timestamp_keeps_its_own_date() {
        assert_eq!(parse_date_part("2024-06-01T23:30:00-05:00"), Some(day("2024-06-01")));
        assert_eq!(parse_date_part("2024-06-01T00:10:00Z"), Some(day("2024-06-01")));
        assert_eq!(parse_date_part("2024-06-01 08:00:00+02:00"), Some(day("2024-06-01")));
        assert_eq!(parse_date_part("2024-06-01T12:30:00+0200"), Some(day("2024-06-01")));
        assert_eq!(parse_date_part("2024-06-01T23:30:00.5-0500"), Some(day("2024-06-01")));
        assert_eq!(parse_date_part("2024-06-01 12:30:00 UTC"), Some(day("2024-06-01")));
        assert_eq!(parse_date_part("2024-06-01 23:59:59.999 UTC"), Some(day("2024-06-01")));
    }

    #[test]
    fn test_utc_suffix_needs_a_time() {
        assert_eq!(parse_date_part("2024-06-01 UTC"), None);
        assert_eq!(parse_date_part("2024-06-01 12:30:00 CET"), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_date_part("yesterday"), None);
        assert_eq!(parse_date_part("2024-13-01"), None);
        assert_eq!(parse_date_part(""), None);
    }

    #[test]
    fn test_truncate_non_string_values() {
        assert!(truncate_to_date(None).is_err());
        assert!(truncate_to_date(Some(&Value::Null)).is_err());
        assert!(truncate_to_date(Some(&json!(19900101))).is_err());
        assert_eq!(
            truncate_to_date(Some(&json!("1990-01-01T12:00:00Z"))),
            Ok(day("1990-01-01"))
        );
    }
}
