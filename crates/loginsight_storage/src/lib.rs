//! # LogInsight Storage
//!
//! Line-oriented storage backends for LogInsight.
//!
//! This crate provides the lowest-level storage abstraction for LogInsight.
//! Line stores are **opaque line stores** - they do not interpret the text
//! of the lines they hold.
//!
//! ## Design Principles
//!
//! - Stores read and write whole line sequences, never partial files
//! - No knowledge of JSON, records, or categories
//! - Must be `Send + Sync` for concurrent access
//! - A missing backing file is an empty sequence, not an error
//!
//! ## Available Stores
//!
//! - [`InMemoryLineStore`] - For testing and ephemeral storage
//! - [`FileLineStore`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use loginsight_storage::{LineStore, InMemoryLineStore};
//!
//! let store = InMemoryLineStore::new();
//! store.append_line("hello").unwrap();
//! store.append_line("world").unwrap();
//! assert_eq!(store.load_lines().unwrap(), vec!["hello", "world"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod lines;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::{FileLineStore, RewriteMode};
pub use lines::{join_lines, split_lines};
pub use memory::InMemoryLineStore;
pub use store::{FileStat, LineSnapshot, LineStore, StoreLock};
