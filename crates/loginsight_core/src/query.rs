//! Query engine: filter, sort, and paginate the records of one category.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::record::{LogLine, Record};
use crate::time::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A query over one category.
///
/// `page` is 1-based. Values below 1 for `page` or `limit` are treated as 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Page to return.
    pub page: usize,
    /// Maximum entries per page.
    pub limit: usize,
    /// Case-insensitive substring of the serialized record; empty matches all.
    pub search: String,
    /// Exclude records earlier than this.
    pub start: Option<DateTime<Utc>>,
    /// Exclude records later than this.
    pub end: Option<DateTime<Utc>>,
}

impl Default for LogQuery {
    fn default() -> Self {
        let config = Config::default();
        Self {
            page: config.default_page,
            limit: config.default_limit,
            search: String::new(),
            start: None,
            end: None,
        }
    }
}

impl LogQuery {
    /// Creates a query for the first page with the default page size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page.
    #[must_use]
    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the search text.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
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

    /// Date filter. A record without an orderable `time` fails every bound
    /// it is checked against.
    fn within_dates(&self, record: &Record) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(time) = record.timestamp() else {
            return false;
        };
        self.start.map_or(true, |start| time >= start) && self.end.map_or(true, |end| time <= end)
    }
}

/// Raw query parameters as a transport layer receives them.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<'a> {
    /// Page number text.
    pub page: Option<&'a str>,
    /// Page size text.
    pub limit: Option<&'a str>,
    /// Search text.
    pub search: Option<&'a str>,
    /// Lower date bound text.
    pub start_date: Option<&'a str>,
    /// Upper date bound text.
    pub end_date: Option<&'a str>,
}

impl QueryParams<'_> {
    /// Resolves the parameters into a query.
    ///
    /// Absent, non-numeric, or zero page and limit values fall back to the
    /// configured defaults. Empty date bounds are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDate`] if a date bound is given but cannot
    /// be parsed.
    pub fn resolve(&self, config: &Config) -> CoreResult<LogQuery> {
        Ok(LogQuery {
            page: positive_or(self.page, config.default_page),
            limit: positive_or(self.limit, config.default_limit),
            search: self.search.unwrap_or_default().to_string(),
            start: date_bound(self.start_date)?,
            end: date_bound(self.end_date)?,
        })
    }
}

fn positive_or(text: Option<&str>, default: usize) -> usize {
    text.and_then(|t| t.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(default)
}

/// Parses an optional date bound; blank text counts as absent.
pub(crate) fn date_bound(text: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(None),
        Some(t) => parse_timestamp(t)
            .map(Some)
            .ok_or_else(|| CoreError::invalid_date(t)),
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    /// Records on this page, most recent first.
    pub entries: Vec<Record>,
    /// Number of records matching the filters.
    pub total: usize,
    /// The page returned.
    pub page: usize,
    /// Number of pages at this page size; 0 when nothing matched.
    pub total_pages: usize,
    /// The page size used.
    pub limit: usize,
}

/// Runs `query` over the raw lines of one file.
pub(crate) fn run_query(lines: Vec<String>, query: &LogQuery) -> LogPage {
    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let needle = query.search.to_lowercase();

    let mut matches: Vec<(Option<DateTime<Utc>>, Record)> = lines
        .into_iter()
        .filter_map(|line| LogLine::parse(line).into_record())
        .filter(|record| query.within_dates(record))
        .filter(|record| needle.is_empty() || record.contains_lowercase(&needle))
        .map(|record| (record.timestamp(), record))
        .collect();

    // Stable: equal times keep file order, and records without an orderable
    // time follow all others in file order.
    matches.sort_by(|a, b| b.0.cmp(&a.0));

    let total = matches.len();
    let entries = matches
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .map(|(_, record)| record)
        .collect();

    LogPage {
        entries,
        total,
        page,
        total_pages: total.div_ceil(limit),
        limit,
    }
}
