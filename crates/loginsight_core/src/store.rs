//! Log store: one [`CategoryLog`] per category, owned by a [`LogStore`].
//!
//! ```text
//! <log_dir>/
//! ├─ general.log       # one JSON record per line
//! ├─ general.log.lock  # advisory lock, created by the first write
//! ├─ login.log
//! ├─ tokens.log
//! └─ app.log
//! ```
//!
//! Queries and stats take the per-category lock shared; deletions and
//! appends take it exclusive, together with the store's advisory file lock,
//! for their whole read-modify-write sequence. Writers outside this process
//! that ignore the lock can still append during a deletion; their lines are
//! carried into the rewritten file.

use crate::category::Category;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::event::{Level, LogEvent};
use crate::mutation::{plan_deletion, DeleteConditions, DeleteOutcome};
use crate::query::{run_query, LogPage, LogQuery};
use crate::stats::{CategoryStats, LogStats};
use chrono::Utc;
use loginsight_storage::{FileLineStore, InMemoryLineStore, LineSnapshot, LineStore, RewriteMode};
use parking_lot::RwLock;
use std::fs;
use tracing::{debug, info, warn};

/// The log of a single category.
pub struct CategoryLog {
    category: Category,
    store: Box<dyn LineStore>,
    lock: RwLock<()>,
    max_file_size: Option<u64>,
}

impl std::fmt::Debug for CategoryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryLog")
            .field("category", &self.category)
            .field("max_file_size", &self.max_file_size)
            .finish_non_exhaustive()
    }
}

impl CategoryLog {
    /// Creates a category log over `store`.
    #[must_use]
    pub fn new(category: Category, store: Box<dyn LineStore>) -> Self {
        Self {
            category,
            store,
            lock: RwLock::new(()),
            max_file_size: None,
        }
    }

    /// Sets the size above which queries and deletions refuse the file.
    #[must_use]
    pub fn with_max_file_size(mut self, limit: Option<u64>) -> Self {
        self.max_file_size = limit;
        self
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Runs a read-only query.
    ///
    /// A missing file yields an empty page.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or exceeds the size limit.
    pub fn query(&self, query: &LogQuery) -> CoreResult<LogPage> {
        let _guard = self.lock.read();
        let lines = self.load_checked()?.lines;
        let scanned = lines.len();

        let page = run_query(lines, query);
        debug!(
            category = %self.category,
            scanned,
            matched = page.total,
            page = page.page,
            "query"
        );
        Ok(page)
    }

    /// Deletes every record matching `conditions` and rewrites the file.
    ///
    /// Opaque lines are kept. The file is left untouched when nothing
    /// matches, and a missing file is never created. Lines appended by other
    /// writers after the file was read are kept after the retained lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, locked, or rewritten, or
    /// exceeds the size limit.
    pub fn delete_where(&self, conditions: &DeleteConditions) -> CoreResult<DeleteOutcome> {
        if conditions.is_empty() {
            return Ok(DeleteOutcome { deleted_count: 0 });
        }

        let _guard = self.lock.write();
        if self.store.stat()?.is_none() {
            return Ok(DeleteOutcome { deleted_count: 0 });
        }
        let _file_lock = self.store.lock_exclusive()?;

        let snapshot = self.load_checked()?;
        let plan = plan_deletion(snapshot.lines, conditions);

        if plan.deleted > 0 {
            let carried = self.store.replace_since(&plan.retained, snapshot.len)?;
            info!(
                category = %self.category,
                deleted = plan.deleted,
                retained = plan.retained.len(),
                carried,
                "deleted log records"
            );
        }

        Ok(DeleteOutcome {
            deleted_count: plan.deleted,
        })
    }

    /// Appends an event stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] if the event lacks a field this
    /// category requires, or an error if it cannot be serialized or written.
    pub fn append(&self, event: &LogEvent) -> CoreResult<()> {
        event.validate_for(self.category)?;
        let line = event.to_line(Utc::now())?;

        let _guard = self.lock.write();
        let _file_lock = self.store.lock_exclusive()?;
        self.store.append_line(&line)?;
        Ok(())
    }

    /// Reports line count, size, and modification time of the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata or content cannot be read.
    pub fn stats(&self) -> CoreResult<CategoryStats> {
        let _guard = self.lock.read();
        match self.store.stat()? {
            None => Ok(CategoryStats::absent()),
            Some(stat) => {
                let count = self.store.load_lines()?.len();
                Ok(CategoryStats::present(stat, count))
            }
        }
    }

    fn load_checked(&self) -> CoreResult<LineSnapshot> {
        if let Some(limit) = self.max_file_size {
            if let Some(stat) = self.store.stat()? {
                if stat.size > limit {
                    warn!(category = %self.category, size = stat.size, limit, "log file over size limit");
                    return Err(CoreError::FileTooLarge {
                        category: self.category,
                        size: stat.size,
                        limit,
                    });
                }
            }
        }
        Ok(self.store.load_snapshot()?)
    }
}

/// The composition root: owns the log of every category.
///
/// # Example
///
/// ```no_run
/// use loginsight_core::{Config, LogQuery, LogStore};
///
/// let store = LogStore::open(Config::from_env())?;
/// let page = store.query("login", &LogQuery::new().search("failed"))?;
/// println!("{} failed logins", page.total);
/// # Ok::<(), loginsight_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct LogStore {
    config: Config,
    logs: Vec<CategoryLog>,
}

impl LogStore {
    /// Opens the store over the configured log directory.
    ///
    /// Creates the directory if it does not exist; category files are only
    /// created by writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(config: Config) -> CoreResult<Self> {
        fs::create_dir_all(&config.log_dir)?;
        info!(dir = %config.log_dir.display(), "opened log store");

        let sync = config.sync_on_write;
        let mode = if config.rewrite_in_place {
            RewriteMode::InPlace
        } else {
            RewriteMode::Rename
        };
        let dir = config.log_dir.clone();
        Ok(Self::with_stores(config, |category| {
            Box::new(
                FileLineStore::open(&dir.join(category.file_name()))
                    .with_sync(sync)
                    .with_rewrite_mode(mode),
            )
        }))
    }

    /// Creates a store whose categories live in memory.
    #[must_use]
    pub fn in_memory(config: Config) -> Self {
        Self::with_stores(config, |_| Box::new(InMemoryLineStore::new()))
    }

    /// Creates a store with a caller-supplied line store per category.
    #[must_use]
    pub fn with_stores<F>(config: Config, mut make_store: F) -> Self
    where
        F: FnMut(Category) -> Box<dyn LineStore>,
    {
        let logs = Category::ALL
            .into_iter()
            .map(|category| {
                CategoryLog::new(category, make_store(category))
                    .with_max_file_size(config.max_file_size)
            })
            .collect();
        Self { config, logs }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the log of one category.
    #[must_use]
    pub fn log(&self, category: Category) -> &CategoryLog {
        &self.logs[category.index()]
    }

    /// Resolves a category name to its log.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCategory`] for unknown names.
    pub fn resolve(&self, name: &str) -> CoreResult<&CategoryLog> {
        Category::resolve(name).map(|category| self.log(category))
    }

    /// Queries the named category.
    ///
    /// # Errors
    ///
    /// See [`LogStore::resolve`] and [`CategoryLog::query`].
    pub fn query(&self, category: &str, query: &LogQuery) -> CoreResult<LogPage> {
        self.resolve(category)?.query(query)
    }

    /// Deletes matching records from the named category.
    ///
    /// # Errors
    ///
    /// See [`LogStore::resolve`] and [`CategoryLog::delete_where`].
    pub fn delete_where(
        &self,
        category: &str,
        conditions: &DeleteConditions,
    ) -> CoreResult<DeleteOutcome> {
        self.resolve(category)?.delete_where(conditions)
    }

    /// Deletes matching records and records the deletion in the `app` log.
    ///
    /// The `app` record carries the category `type`, the `conditions` and
    /// the `deletedCount`, and is written even when nothing matched.
    ///
    /// # Errors
    ///
    /// See [`LogStore::delete_where`] and [`LogStore::append`].
    pub fn delete_audited(
        &self,
        category: &str,
        conditions: &DeleteConditions,
    ) -> CoreResult<DeleteOutcome> {
        let outcome = self.delete_where(category, conditions)?;

        let event = LogEvent::new(Level::Info, "Logs deleted")
            .field("type", category)
            .field("conditions", serde_json::to_value(conditions)?)
            .field("deletedCount", outcome.deleted_count);
        self.log(Category::App).append(&event)?;
        Ok(outcome)
    }

    /// Appends an event to the named category.
    ///
    /// # Errors
    ///
    /// See [`LogStore::resolve`] and [`CategoryLog::append`].
    pub fn append(&self, category: &str, event: &LogEvent) -> CoreResult<()> {
        self.resolve(category)?.append(event)
    }

    /// Reports statistics for every category.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any category cannot be inspected.
    pub fn stats(&self) -> CoreResult<LogStats> {
        self.logs
            .iter()
            .map(|log| log.stats().map(|stats| (log.category(), stats)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = concat!(
        r#"{"time":"2024-01-01T00:00:00Z","level":"info","msg":"a"}"#,
        "\nnot json\n",
        r#"{"time":"2024-02-01T00:00:00Z","level":"error","msg":"b"}"#,
        "\n",
    );

    fn sample_log() -> CategoryLog {
        CategoryLog::new(
            Category::General,
            Box::new(InMemoryLineStore::with_content(SAMPLE)),
        )
    }

    #[test]
    fn unknown_category_is_rejected() {
        let store = LogStore::in_memory(Config::default());

        let err = store.query("audit", &LogQuery::new()).unwrap_err();
        assert!(err.is_client_error());
        assert!(store
            .delete_where("audit", &DeleteConditions::new().search("x"))
            .is_err());
        assert!(store
            .append("audit", &LogEvent::new(Level::Info, "x"))
            .is_err());
    }

    #[test]
    fn missing_category_is_empty() {
        let store = LogStore::in_memory(Config::default());

        let page = store.query("tokens", &LogQuery::new()).unwrap();
        assert!(page.entries.is_empty());
        assert_eq!((page.total, page.total_pages), (0, 0));

        let outcome = store
            .delete_where("tokens", &DeleteConditions::new().search("x"))
            .unwrap();
        assert_eq!(outcome.deleted_count, 0);

        let stats = store.stats().unwrap();
        assert_eq!(stats.len(), 4);
        assert!(stats.values().all(|s| *s == CategoryStats::absent()));
    }

    #[test]
    fn append_then_query() {
        let store = LogStore::in_memory(Config::default());
        store
            .append(
                "login",
                &LogEvent::new(Level::Info, "Successful login").field("username", "admin"),
            )
            .unwrap();

        let page = store.query("login", &LogQuery::new()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].get("username"), Some(&json!("admin")));
        assert!(page.entries[0].timestamp().is_some());

        let stats = store.stats().unwrap();
        assert_eq!(stats[&Category::Login].count, 1);
        assert_eq!(stats[&Category::General].count, 0);
    }

    #[test]
    fn append_checks_required_fields() {
        let store = LogStore::in_memory(Config::default());

        let err = store
            .append("tokens", &LogEvent::new(Level::Info, "Token usage recorded"))
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(store.log(Category::Tokens).stats().unwrap().size, 0);
    }

    #[test]
    fn audited_delete_writes_app_record_even_when_nothing_matches() {
        let store = LogStore::in_memory(Config::default());

        let outcome = store
            .delete_audited("login", &DeleteConditions::new().search("nobody"))
            .unwrap();
        assert_eq!(outcome.deleted_count, 0);

        let page = store.query("app", &LogQuery::new()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].get("type"), Some(&json!("login")));
        assert_eq!(page.entries[0].get("deletedCount"), Some(&json!(0)));
        assert_eq!(
            page.entries[0].get("conditions"),
            Some(&json!({"search": "nobody"}))
        );
    }

    #[test]
    fn delete_keeps_opaque_lines() {
        let log = sample_log();
        let outcome = log
            .delete_where(&DeleteConditions::new().search("error"))
            .unwrap();
        assert_eq!(outcome.deleted_count, 1);

        let stats = log.stats().unwrap();
        assert_eq!(stats.count, 2);

        let page = log.query(&LogQuery::new()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].get("msg"), Some(&json!("a")));
    }

    #[test]
    fn stats_count_every_line() {
        let stats = sample_log().stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.size, SAMPLE.len() as u64);
        assert!(stats.last_modified.is_some());
    }

    #[test]
    fn size_guard_refuses_large_files() {
        let log = sample_log().with_max_file_size(Some(10));

        let err = log.query(&LogQuery::new()).unwrap_err();
        assert!(matches!(err, CoreError::FileTooLarge { limit: 10, .. }));
        assert!(log
            .delete_where(&DeleteConditions::new().search("a"))
            .is_err());

        // Stats never load through the guard.
        assert_eq!(log.stats().unwrap().count, 3);
    }
}
