//! Event writer: builds lines in the on-disk record format.

use crate::category::Category;
use crate::error::{CoreError, CoreResult};
use crate::record::TIME_FIELD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

const LEVEL_FIELD: &str = "level";
const MESSAGE_FIELD: &str = "msg";

/// Severity of an appended event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Very fine-grained tracing.
    Trace,
    /// Debugging detail.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected but recoverable.
    Warn,
    /// A failed operation.
    Error,
    /// The process cannot continue.
    Fatal,
}

impl Level {
    /// Returns the level name written to records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            _ => Err(CoreError::InvalidLevel {
                name: s.to_string(),
            }),
        }
    }
}

/// An event to append to a category.
///
/// # Example
///
/// ```rust
/// use loginsight_core::{Level, LogEvent};
///
/// let event = LogEvent::new(Level::Warn, "Failed login attempt")
///     .field("username", "admin")
///     .field("reason", "Invalid password");
/// assert_eq!(event.message(), "Failed login attempt");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    level: Level,
    message: String,
    fields: Map<String, Value>,
}

impl LogEvent {
    /// Creates an event with no extra fields.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Adds a free-form field.
    ///
    /// `level`, `time` and `msg` are reserved; values given for them are
    /// ignored when the line is written.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns the level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Checks the fields `category` requires.
    ///
    /// `general` events need a non-empty message. `tokens` events need a
    /// non-empty `model` and a `totalTokens` field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] naming the first missing field.
    pub fn validate_for(&self, category: Category) -> CoreResult<()> {
        let missing = |field: &'static str| -> CoreResult<()> {
            Err(CoreError::MissingField { category, field })
        };
        match category {
            Category::General if self.message.is_empty() => missing("message"),
            Category::Tokens if !self.fields.get("model").is_some_and(is_present) => {
                missing("model")
            }
            Category::Tokens if !self.fields.contains_key("totalTokens") => {
                missing("totalTokens")
            }
            _ => Ok(()),
        }
    }

    /// Serializes the event as one line stamped with `time`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field value cannot be serialized.
    pub fn to_line(&self, time: DateTime<Utc>) -> CoreResult<String> {
        let mut object = Map::with_capacity(self.fields.len() + 3);
        object.insert(LEVEL_FIELD.into(), Value::from(self.level.as_str()));
        object.insert(
            TIME_FIELD.into(),
            Value::from(time.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        object.insert(MESSAGE_FIELD.into(), Value::from(self.message.as_str()));

        for (key, value) in &self.fields {
            if !object.contains_key(key) {
                object.insert(key.clone(), value.clone());
            }
        }

        Ok(serde_json::to_string(&object)?)
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
