//! Record parser.
//!
//! Every stored line is either a [`Record`] (a JSON object) or an opaque
//! line kept verbatim. Parsing never fails and never drops a line.

use crate::time::timestamp_of;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Name of the conventional timestamp field.
pub(crate) const TIME_FIELD: &str = "time";

/// Largest float magnitude below which every integral value is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// One line of a log file, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    /// A line holding a single JSON object.
    Record(Record),
    /// Any other line, carried verbatim.
    Opaque(String),
}

impl LogLine {
    /// Classifies a line.
    ///
    /// Only a complete JSON object parses as a record. Malformed syntax,
    /// a truncated tail, or any other top-level value yields
    /// [`LogLine::Opaque`].
    #[must_use]
    pub fn parse(line: String) -> Self {
        match serde_json::from_str::<Map<String, Value>>(&line) {
            Ok(fields) => Self::Record(Record { fields, raw: line }),
            Err(_) => Self::Opaque(line),
        }
    }

    /// Returns the original line text.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Record(record) => record.raw(),
            Self::Opaque(line) => line,
        }
    }

    /// Consumes the line, returning the original text.
    #[must_use]
    pub fn into_raw(self) -> String {
        match self {
            Self::Record(record) => record.raw,
            Self::Opaque(line) => line,
        }
    }

    /// Returns the record, if the line parsed as one.
    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Opaque(_) => None,
        }
    }
}

/// A parsed log entry.
///
/// Serializes as its JSON object. Equality compares fields, not the raw
/// line text.
#[derive(Debug, Clone)]
pub struct Record {
    fields: Map<String, Value>,
    raw: String,
}

impl Record {
    /// Returns all fields in their stored order.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns one field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the raw `time` field.
    #[must_use]
    pub fn time(&self) -> Option<&Value> {
        self.get(TIME_FIELD)
    }

    /// Returns the `time` field as a timestamp, or `None` if it is missing
    /// or not orderable.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.time().and_then(timestamp_of)
    }

    /// Returns the line the record was parsed from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the compact JSON serialization of the record.
    ///
    /// Floats with no fractional part are written as integers (`1.0` as
    /// `1`), matching what JavaScript-based writers put on disk for the
    /// same value. Other numbers render as `serde_json` writes them.
    #[must_use]
    pub fn serialized(&self) -> String {
        let rendered = if self.fields.values().any(has_integral_float) {
            let mut fields = self.fields.clone();
            fields.values_mut().for_each(integral_floats_as_integers);
            serde_json::to_string(&fields)
        } else {
            serde_json::to_string(&self.fields)
        };
        rendered.unwrap_or_default()
    }

    /// Case-insensitive substring match against [`Record::serialized`].
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        self.serialized().to_lowercase().contains(needle)
    }
}

fn integral_float(number: &Number) -> Option<i64> {
    let value = number.as_f64().filter(|_| number.is_f64())?;
    (value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER).then(|| value as i64)
}

fn has_integral_float(value: &Value) -> bool {
    match value {
        Value::Number(n) => integral_float(n).is_some(),
        Value::Array(items) => items.iter().any(has_integral_float),
        Value::Object(map) => map.values().any(has_integral_float),
        _ => false,
    }
}

fn integral_floats_as_integers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(int) = integral_float(n) {
                *n = Number::from(int);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(integral_floats_as_integers),
        Value::Object(map) => map.values_mut().for_each(integral_floats_as_integers),
        _ => {}
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
