//! Query command implementation.

use loginsight_core::{CoreResult, LogPage, LogStore, QueryParams, Record};

/// Runs the query command.
pub fn run(
    store: &LogStore,
    category: &str,
    params: &QueryParams<'_>,
    format: &str,
) -> CoreResult<()> {
    let query = params.resolve(store.config())?;
    let page = store.query(category, &query)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_text(&page);
    }

    Ok(())
}

fn print_text(page: &LogPage) {
    for record in &page.entries {
        println!("{}", format_record(record));
    }
    if !page.entries.is_empty() {
        println!();
    }
    println!(
        "page {}/{} ({} matching, {} per page)",
        page.page, page.total_pages, page.total, page.limit
    );
}

/// Renders `time level msg` followed by the remaining fields as JSON.
fn format_record(record: &Record) -> String {
    let text = |key: &str| match record.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    };

    let rest: serde_json::Map<String, serde_json::Value> = record
        .fields()
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "time" | "level" | "msg"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut line = format!("{} {:<5} {}", text("time"), text("level"), text("msg"));
    if !rest.is_empty() {
        line.push(' ');
        line.push_str(&serde_json::Value::Object(rest).to_string());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use loginsight_core::LogLine;

    fn record(line: &str) -> Record {
        LogLine::parse(line.to_string()).into_record().unwrap()
    }

    #[test]
    fn formats_known_fields_first() {
        let line = format_record(&record(
            r#"{"level":"warn","time":"2024-01-01T00:00:00Z","msg":"Failed login","ip":"::1"}"#,
        ));
        assert_eq!(line, r#"2024-01-01T00:00:00Z warn  Failed login {"ip":"::1"}"#);
    }

    #[test]
    fn formats_missing_and_numeric_fields() {
        let line = format_record(&record(r#"{"level":30,"time":1704067200000}"#));
        assert_eq!(line, "1704067200000 30    -");
    }
}
