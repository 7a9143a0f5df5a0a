//! Line store trait definition.

use crate::error::StorageResult;
use fs2::FileExt;
use std::fs::File;
use std::time::SystemTime;

/// A low-level line store backing one log file.
///
/// Line stores are **opaque line stores**. They load and replace the whole
/// line sequence of a single file and append single lines to it. Callers own
/// all interpretation of line contents.
///
/// # Invariants
///
/// - `load_lines` never returns a line that is empty or whitespace-only
/// - `load_lines` on a missing file returns an empty sequence
/// - after `replace_lines`, a non-empty file ends with exactly one `\n`,
///   and an empty sequence leaves an empty file
/// - `replace_lines` is atomic from a reader's point of view, unless the
///   store documents otherwise (see [`super::RewriteMode::InPlace`])
/// - `replace_since` keeps every line appended after the snapshot it was
///   given, even by writers that bypass [`LineStore::lock_exclusive`]
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryLineStore`] - For testing
/// - [`super::FileLineStore`] - For persistent storage
pub trait LineStore: Send + Sync {
    /// Loads every non-blank line, together with the number of bytes read.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not
    /// valid UTF-8.
    fn load_snapshot(&self) -> StorageResult<LineSnapshot>;

    /// Loads every non-blank line, in file order.
    ///
    /// # Errors
    ///
    /// See [`LineStore::load_snapshot`].
    fn load_lines(&self) -> StorageResult<Vec<String>> {
        Ok(self.load_snapshot()?.lines)
    }

    /// Replaces the full content of the file with `lines`.
    ///
    /// Creates the file if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the new content cannot be written.
    fn replace_lines(&self, lines: &[String]) -> StorageResult<()>;

    /// Replaces the content read by a snapshot of `loaded_len` bytes with
    /// `lines`, keeping whatever was appended past those bytes since.
    ///
    /// Lines found beyond `loaded_len` are written after `lines`, verbatim
    /// and in order. Returns how many such lines were carried over.
    ///
    /// # Errors
    ///
    /// Returns an error if the new content cannot be written.
    fn replace_since(&self, lines: &[String], loaded_len: u64) -> StorageResult<usize>;

    /// Appends one line, terminated by `\n`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    fn append_line(&self, line: &str) -> StorageResult<()>;

    /// Returns size and modification time, or `None` if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if file metadata cannot be read.
    fn stat(&self) -> StorageResult<Option<FileStat>>;

    /// Acquires an exclusive lock that cooperating writers honour.
    ///
    /// The lock is held until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    fn lock_exclusive(&self) -> StorageResult<StoreLock>;
}

/// Lines read from a store, with the byte length they were read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSnapshot {
    /// Non-blank lines in file order.
    pub lines: Vec<String>,
    /// Bytes of file content the lines were read from.
    pub len: u64,
}

/// File metadata reported by [`LineStore::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size of the file in bytes.
    pub size: u64,
    /// Last modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
}

/// Guard for an exclusive store lock.
///
/// Dropping the guard releases the lock.
#[derive(Debug)]
pub struct StoreLock {
    file: Option<File>,
}

impl StoreLock {
    /// A guard that holds no OS-level lock.
    #[must_use]
    pub fn none() -> Self {
        Self { file: None }
    }

    pub(crate) fn file(file: File) -> Self {
        Self { file: Some(file) }
    }

    /// Returns true if an OS-level advisory lock is held.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            // Closing the handle releases the lock as well.
            let _ = FileExt::unlock(file);
        }
    }
}
