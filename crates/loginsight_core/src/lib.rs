//! # LogInsight Core
//!
//! Query and retention engine over category log files.
//!
//! Events live in newline-delimited JSON files, one file per [`Category`].
//! This crate provides:
//! - A fixed category registry mapping names to file names
//! - A tolerant line parser ([`LogLine`]): unparsable lines are kept, never dropped
//! - Filtered, reverse-chronological, paginated queries
//! - Conditional bulk deletion by full-file rewrite
//! - Per-category file statistics
//! - An event writer that appends records in the on-disk format
//!
//! ## Example
//!
//! ```rust
//! use loginsight_core::{Config, DeleteConditions, Level, LogEvent, LogQuery, LogStore};
//!
//! let store = LogStore::in_memory(Config::default());
//! store.append("general", &LogEvent::new(Level::Info, "started")).unwrap();
//!
//! let page = store.query("general", &LogQuery::new()).unwrap();
//! assert_eq!(page.total, 1);
//!
//! let outcome = store
//!     .delete_where("general", &DeleteConditions::new().search("started"))
//!     .unwrap();
//! assert_eq!(outcome.deleted_count, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod category;
mod config;
mod error;
mod event;
mod mutation;
mod query;
mod record;
mod stats;
mod store;
mod time;

pub use category::Category;
pub use config::{Config, LOG_DIR_ENV};
pub use error::{CoreError, CoreResult};
pub use event::{Level, LogEvent};
pub use mutation::{DeleteConditions, DeleteOutcome};
pub use query::{LogPage, LogQuery, QueryParams};
pub use record::{LogLine, Record};
pub use stats::{CategoryStats, LogStats};
pub use store::{CategoryLog, LogStore};
pub use time::{parse_timestamp, timestamp_of};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
