//! In-memory line store for testing.

use crate::error::StorageResult;
use crate::lines::{join_lines, split_lines};
use crate::store::{FileStat, LineSnapshot, LineStore, StoreLock};
use parking_lot::RwLock;
use std::time::SystemTime;

/// An in-memory line store.
///
/// Holds the would-be file content as a string, distinguishing an absent
/// file from an empty one. Suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Example
///
/// ```rust
/// use loginsight_storage::{LineStore, InMemoryLineStore};
///
/// let store = InMemoryLineStore::with_content("a\n\nb\n");
/// assert_eq!(store.load_lines().unwrap(), vec!["a", "b"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLineStore {
    file: RwLock<Option<MemoryFile>>,
}

#[derive(Debug, Clone)]
struct MemoryFile {
    content: String,
    modified: SystemTime,
}

impl MemoryFile {
    fn new(content: String) -> Self {
        Self {
            content,
            modified: SystemTime::now(),
        }
    }
}

impl InMemoryLineStore {
    /// Creates a store whose file does not exist yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-existing raw file content.
    #[must_use]
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            file: RwLock::new(Some(MemoryFile::new(content.into()))),
        }
    }

    /// Returns the raw file content, or `None` if the file is absent.
    #[must_use]
    pub fn content(&self) -> Option<String> {
        self.file.read().as_ref().map(|f| f.content.clone())
    }
}

impl LineStore for InMemoryLineStore {
    fn load_snapshot(&self) -> StorageResult<LineSnapshot> {
        Ok(self
            .file
            .read()
            .as_ref()
            .map(|f| LineSnapshot {
                lines: split_lines(&f.content),
                len: f.content.len() as u64,
            })
            .unwrap_or_default())
    }

    fn replace_lines(&self, lines: &[String]) -> StorageResult<()> {
        *self.file.write() = Some(MemoryFile::new(join_lines(lines)));
        Ok(())
    }

    fn replace_since(&self, lines: &[String], loaded_len: u64) -> StorageResult<usize> {
        let mut file = self.file.write();
        let tail = file
            .as_ref()
            .and_then(|f| {
                let start = usize::try_from(loaded_len).ok()?;
                f.content.get(start..)
            })
            .map(split_lines)
            .unwrap_or_default();

        let mut content = join_lines(lines);
        content.push_str(&join_lines(&tail));
        *file = Some(MemoryFile::new(content));
        Ok(tail.len())
    }

    fn append_line(&self, line: &str) -> StorageResult<()> {
        let mut file = self.file.write();
        let file = file.get_or_insert_with(|| MemoryFile::new(String::new()));
        if !file.content.is_empty() && !file.content.ends_with('\n') {
            file.content.push('\n');
        }
        file.content.push_str(line);
        file.content.push('\n');
        file.modified = SystemTime::now();
        Ok(())
    }

    fn stat(&self) -> StorageResult<Option<FileStat>> {
        Ok(self.file.read().as_ref().map(|f| FileStat {
            size: f.content.len() as u64,
            modified: Some(f.modified),
        }))
    }

    fn lock_exclusive(&self) -> StorageResult<StoreLock> {
        Ok(StoreLock::none())
    }
}
