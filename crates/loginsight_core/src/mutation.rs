//! Mutation engine: conditional bulk deletion.
//!
//! A record is deleted if it matches the date criterion **or** the search
//! criterion. Opaque lines are always retained.

use crate::error::CoreResult;
use crate::query::date_bound;
use crate::record::{LogLine, Record};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Conditions selecting records to delete.
///
/// With no condition set, nothing is deleted. Serializes with the transport
/// names `startDate`, `endDate` and `search`, omitting unset conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteConditions {
    /// Delete records at or after this time.
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// Delete records at or before this time.
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Delete records whose serialized form contains this text, ignoring case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl DeleteConditions {
    /// Creates an empty condition set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds conditions from raw transport strings.
    ///
    /// Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidDate`] if a date bound is given but
    /// cannot be parsed.
    pub fn from_params(
        start_date: Option<&str>,
        end_date: Option<&str>,
        search: Option<&str>,
    ) -> CoreResult<Self> {
        Ok(Self {
            start: date_bound(start_date)?,
            end: date_bound(end_date)?,
            search: search.filter(|s| !s.is_empty()).map(str::to_owned),
        })
    }

    /// Sets the lower date bound.
    #[must_use]
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the upper date bound.
    #[must_use]
    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets the search text.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Returns true if no condition would select any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.needle().is_none()
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Date criterion. A record without an orderable `time` never matches.
    fn matches_dates(&self, record: &Record) -> bool {
        let Some(time) = record.timestamp() else {
            return false;
        };
        match (self.start, self.end) {
            (Some(start), Some(end)) => time >= start && time <= end,
            (Some(start), None) => time >= start,
            (None, Some(end)) => time <= end,
            (None, None) => false,
        }
    }
}

/// Result of a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// Number of records removed.
    pub deleted_count: usize,
}

/// Lines to keep after a deletion pass.
#[derive(Debug)]
pub(crate) struct DeletionPlan {
    /// Retained lines, verbatim and in file order.
    pub retained: Vec<String>,
    /// Number of records dropped.
    pub deleted: usize,
}

/// Splits `lines` into retained lines and a count of deleted records.
pub(crate) fn plan_deletion(lines: Vec<String>, conditions: &DeleteConditions) -> DeletionPlan {
    let needle = conditions.needle();
    let mut retained = Vec::with_capacity(lines.len());
    let mut deleted = 0;

    for line in lines {
        match LogLine::parse(line) {
            LogLine::Record(record)
                if conditions.matches_dates(&record)
                    || needle
                        .as_deref()
                        .is_some_and(|n| record.contains_lowercase(n)) =>
            {
                deleted += 1;
            }
            kept => retained.push(kept.into_raw()),
        }
    }

    DeletionPlan { retained, deleted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_timestamp;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn sample() -> Vec<String> {
        lines(&[
            r#"{"time":"2024-01-01T00:00:00Z","level":"info","msg":"a"}"#,
            "not json",
            r#"{"time":"2024-02-01T00:00:00Z","level":"error","msg":"b"}"#,
        ])
    }

    fn ts(text: &str) -> DateTime<Utc> {
        parse_timestamp(text).unwrap()
    }

    #[test]
    fn no_conditions_deletes_nothing() {
        let conditions = DeleteConditions::new();
        assert!(conditions.is_empty());

        let plan = plan_deletion(sample(), &conditions);
        assert_eq!(plan.deleted, 0);
        assert_eq!(plan.retained, sample());
    }

    #[test]
    fn empty_search_is_no_condition() {
        let conditions = DeleteConditions::new().search("");
        assert!(conditions.is_empty());
        assert_eq!(plan_deletion(sample(), &conditions).deleted, 0);
    }

    #[test]
    fn date_range_is_inclusive() {
        let conditions = DeleteConditions::new()
            .start(ts("2024-02-01"))
            .end(ts("2024-02-28"));
        let plan = plan_deletion(sample(), &conditions);

        assert_eq!(plan.deleted, 1);
        assert_eq!(plan.retained, sample()[..2].to_vec());
    }

    #[test]
    fn start_only() {
        let plan = plan_deletion(sample(), &DeleteConditions::new().start(ts("2024-01-15")));
        assert_eq!(plan.deleted, 1);
        assert!(plan.retained[0].contains("\"a\""));
    }

    #[test]
    fn end_only() {
        let plan = plan_deletion(sample(), &DeleteConditions::new().end(ts("2024-01-01")));
        assert_eq!(plan.deleted, 1);
        assert_eq!(plan.retained[0], "not json");
    }

    #[test]
    fn search_or_date() {
        // "b" is outside the date range but matches the search.
        let conditions = DeleteConditions::new()
            .start(ts("2023-01-01"))
            .end(ts("2023-12-31"))
            .search("ERROR");
        let plan = plan_deletion(sample(), &conditions);

        assert_eq!(plan.deleted, 1);
        assert_eq!(plan.retained, sample()[..2].to_vec());
    }

    #[test]
    fn search_matches_field_text() {
        let plan = plan_deletion(sample(), &DeleteConditions::new().search("\"a\""));
        assert_eq!(plan.deleted, 1);
        assert_eq!(plan.retained, sample()[1..].to_vec());
    }

    #[test]
    fn unorderable_time_escapes_date_criterion() {
        let input = lines(&[r#"{"msg":"none"}"#, r#"{"time":"soon","msg":"bad"}"#]);
        let conditions = DeleteConditions::new()
            .start(ts("1970-01-01"))
            .end(ts("2100-01-01"));

        let plan = plan_deletion(input.clone(), &conditions);
        assert_eq!(plan.deleted, 0);
        assert_eq!(plan.retained, input);

        let plan = plan_deletion(input, &conditions.search("BAD"));
        assert_eq!(plan.deleted, 1);
    }

    #[test]
    fn opaque_lines_survive_matching_search() {
        let input = lines(&["error: disk full", r#"{"msg":"error"}"#, "{broken"]);
        let plan = plan_deletion(input, &DeleteConditions::new().search("error"));

        assert_eq!(plan.deleted, 1);
        assert_eq!(plan.retained, lines(&["error: disk full", "{broken"]));
    }

    #[test]
    fn retained_records_stay_verbatim() {
        let input = lines(&[r#"{ "msg" : "keep",  "n": 1.50 }"#, r#"{"msg":"drop"}"#]);
        let plan = plan_deletion(input.clone(), &DeleteConditions::new().search("drop"));
        assert_eq!(plan.retained, input[..1].to_vec());
    }

    #[test]
    fn from_params() {
        let conditions =
            DeleteConditions::from_params(Some("2024-02-01"), None, Some("")).unwrap();
        assert_eq!(conditions.start, Some(ts("2024-02-01")));
        assert!(conditions.search.is_none());

        assert!(DeleteConditions::from_params(None, Some("bogus"), None).is_err());
        assert_eq!(
            serde_json::to_value(&conditions).unwrap(),
            serde_json::json!({"startDate": "2024-02-01T00:00:00Z"})
        );
        assert!(DeleteConditions::from_params(Some(" "), None, None)
            .unwrap()
            .is_empty());
    }
}
