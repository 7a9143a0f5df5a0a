//! Append command implementation.

use loginsight_core::{CoreResult, Level, LogEvent, LogStore};
use serde_json::Value;
use tracing::debug;

/// Runs the append command.
pub fn run(
    store: &LogStore,
    category: &str,
    message: &str,
    level: &str,
    fields: Vec<(String, Value)>,
) -> CoreResult<()> {
    let level: Level = level.parse()?;
    let event = fields
        .into_iter()
        .fold(LogEvent::new(level, message), |event, (key, value)| {
            event.field(key, value)
        });

    store.append(category, &event)?;
    debug!(category, %level, "Appended event");
    Ok(())
}

/// Parses a `key=value` field argument.
///
/// The value is kept as JSON when it parses as JSON, otherwise as a string.
pub fn parse_field(arg: &str) -> Result<(String, Value), String> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{arg}'"))?;
    if key.is_empty() {
        return Err(format!("empty field name in '{arg}'"));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
