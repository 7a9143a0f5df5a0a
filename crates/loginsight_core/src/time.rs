//! Timestamp parsing for record `time` fields and date bounds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Date-time layouts without an offset; read as UTC.
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses an ISO-8601 style timestamp.
///
/// Accepts RFC 3339 with any offset, date-times without an offset (taken as
/// UTC), and bare dates (midnight UTC). Returns `None` for anything else.
///
/// ```rust
/// use loginsight_core::parse_timestamp;
///
/// let a = parse_timestamp("2024-02-01").unwrap();
/// let b = parse_timestamp("2024-02-01T00:00:00Z").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reads a record `time` value as a timestamp.
///
/// Strings are parsed with [`parse_timestamp`]; integers are epoch
/// milliseconds. Any other value is not orderable.
#[must_use]
pub fn timestamp_of(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_timestamp(text),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
