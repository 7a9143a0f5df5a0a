//! Per-category file statistics.

use crate::category::Category;
use chrono::{DateTime, Utc};
use loginsight_storage::FileStat;
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics for every category, in registry order.
pub type LogStats = BTreeMap<Category, CategoryStats>;

/// Statistics for one category file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// Non-blank lines in the file, records and opaque lines alike.
    pub count: usize,
    /// File size in bytes.
    pub size: u64,
    /// File modification time; `None` when the file is absent.
    pub last_modified: Option<DateTime<Utc>>,
}

impl CategoryStats {
    /// Statistics of a category whose file does not exist.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            count: 0,
            size: 0,
            last_modified: None,
        }
    }

    pub(crate) fn present(stat: FileStat, count: usize) -> Self {
        Self {
            count,
            size: stat.size,
            last_modified: stat.modified.map(DateTime::<Utc>::from),
        }
    }
}
