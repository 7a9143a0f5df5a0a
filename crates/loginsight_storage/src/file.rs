//! File-based line store for persistent storage.

use crate::error::{StorageError, StorageResult};
use crate::lines::{join_lines, split_lines};
use crate::store::{FileStat, LineSnapshot, LineStore, StoreLock};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the temporary file used by [`LineStore::replace_lines`].
const TEMP_SUFFIX: &str = ".tmp";
/// Suffix of the advisory lock file used by [`LineStore::lock_exclusive`].
const LOCK_SUFFIX: &str = ".lock";

/// How [`FileLineStore`] rewrites a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RewriteMode {
    /// Write a temporary file and rename it over the original.
    ///
    /// Readers see either the old or the new content, never a mix. A
    /// writer holding a descriptor opened before the rename keeps writing
    /// to the replaced inode, and those lines never reach the new file.
    #[default]
    Rename,
    /// Truncate and overwrite the original file through its own inode.
    ///
    /// Descriptors held by other writers stay valid, including `O_APPEND`
    /// handles kept open for the life of a process. A crash mid-write can
    /// leave the file partially rewritten.
    InPlace,
}

/// A line store backed by one file on disk.
///
/// Opening a store never touches the file system: the file is created
/// lazily by the first append or rewrite.
///
/// # Durability
///
/// With `sync` enabled (the default), rewrites fsync the temporary file and
/// the parent directory around the rename, and appends fsync the file.
///
/// # External writers
///
/// Writers that reopen the file for every line are safe in either
/// [`RewriteMode`]. Writers that keep one descriptor open for the life of
/// the process need [`RewriteMode::InPlace`]; see [`RewriteMode::Rename`].
///
/// # Thread Safety
///
/// The store holds no open handles and can be shared across threads.
/// Callers serialize read-modify-write sequences with
/// [`LineStore::lock_exclusive`].
///
/// # Example
///
/// ```no_run
/// use loginsight_storage::{LineStore, FileLineStore};
/// use std::path::Path;
///
/// let store = FileLineStore::open(Path::new("logs/app.log"));
/// store.append_line(r#"{"time":"2024-01-01T00:00:00Z","msg":"up"}"#).unwrap();
/// assert_eq!(store.load_lines().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FileLineStore {
    path: PathBuf,
    sync: bool,
    mode: RewriteMode,
}

impl FileLineStore {
    /// Creates a store for the file at `path`.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            sync: true,
            mode: RewriteMode::default(),
        }
    }

    /// Sets how rewrites replace the file.
    #[must_use]
    pub fn with_rewrite_mode(mut self, mode: RewriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets whether writes are fsynced.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> StorageResult<()> {
        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn decode(&self, bytes: Vec<u8>) -> StorageResult<String> {
        String::from_utf8(bytes).map_err(|_| StorageError::InvalidUtf8 {
            path: self.path.clone(),
        })
    }

    /// Reads the lines past `offset` in `file` and the length they end at.
    fn read_tail(&self, file: &mut File, offset: u64) -> StorageResult<(Vec<String>, u64)> {
        let len = file.metadata()?.len();
        if len <= offset {
            return Ok((Vec::new(), offset));
        }

        let mut bytes = Vec::new();
        file.seek(SeekFrom::Start(offset))?;
        file.read_to_end(&mut bytes)?;
        let end = offset + bytes.len() as u64;
        Ok((split_lines(&self.decode(bytes)?), end))
    }

    /// Like [`FileLineStore::read_tail`], reopening the file by path.
    fn read_tail_at_path(&self, offset: u64) -> StorageResult<(Vec<String>, u64)> {
        match File::open(&self.path) {
            Ok(mut file) => self.read_tail(&mut file, offset),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((Vec::new(), offset)),
            Err(e) => Err(e.into()),
        }
    }

    fn rewrite_renaming(&self, lines: &[String], loaded_len: u64) -> StorageResult<usize> {
        self.ensure_parent()?;

        let temp_path = self.sibling(TEMP_SUFFIX);
        let mut file = File::create(&temp_path)?;
        file.write_all(join_lines(lines).as_bytes())?;

        // Pick up lines appended since the load until the file stops growing.
        let mut carried = 0;
        let mut offset = loaded_len;
        loop {
            let (tail, end) = self.read_tail_at_path(offset)?;
            if tail.is_empty() && end == offset {
                break;
            }
            carried += tail.len();
            file.write_all(join_lines(&tail).as_bytes())?;
            offset = end;
        }

        if self.sync {
            file.sync_all()?;
        }
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if self.sync {
            self.sync_directory()?;
        }
        Ok(carried)
    }

    fn rewrite_in_place(&self, lines: &[String], loaded_len: u64) -> StorageResult<usize> {
        self.ensure_parent()?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        let (tail, _) = self.read_tail(&mut file, loaded_len)?;
        let mut content = join_lines(lines);
        content.push_str(&join_lines(&tail));

        // Shrink first: appends landing after this go past the new content.
        file.set_len(content.len() as u64)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(content.as_bytes())?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(tail.len())
    }

    /// Syncs the parent directory so a rename is durable.
    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        let dir = File::open(self.parent().unwrap_or_else(|| Path::new(".")))?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        // NTFS journaling covers rename durability
        Ok(())
    }
}

impl LineStore for FileLineStore {
    fn load_snapshot(&self) -> StorageResult<LineSnapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LineSnapshot::default()),
            Err(e) => return Err(e.into()),
        };

        let len = bytes.len() as u64;
        let content = self.decode(bytes)?;
        Ok(LineSnapshot {
            lines: split_lines(&content),
            len,
        })
    }

    /// Replaces the whole file with `lines`.
    ///
    /// In [`RewriteMode::Rename`], a writer that opened the file before this
    /// call and keeps its descriptor afterwards writes to the replaced
    /// inode: its later lines are lost. Use [`RewriteMode::InPlace`] when
    /// such writers exist.
    fn replace_lines(&self, lines: &[String]) -> StorageResult<()> {
        self.replace_since(lines, u64::MAX).map(|_| ())
    }

    /// Replaces the first `loaded_len` bytes' worth of lines with `lines`.
    ///
    /// The file is re-read past `loaded_len` immediately before it is
    /// replaced, so lines appended without the advisory lock survive.
    /// The same descriptor hazard as [`FileLineStore::replace_lines`]
    /// applies in [`RewriteMode::Rename`].
    fn replace_since(&self, lines: &[String], loaded_len: u64) -> StorageResult<usize> {
        let carried = match self.mode {
            RewriteMode::Rename => self.rewrite_renaming(lines, loaded_len)?,
            RewriteMode::InPlace => self.rewrite_in_place(lines, loaded_len)?,
        };

        debug!(
            path = %self.path.display(),
            lines = lines.len(),
            carried,
            mode = ?self.mode,
            "replaced file content"
        );
        Ok(carried)
    }

    fn append_line(&self, line: &str) -> StorageResult<()> {
        self.ensure_parent()?;

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        // Keep a previous unterminated line from swallowing this one.
        let mut data = Vec::with_capacity(line.len() + 2);
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                data.push(b'\n');
            }
        }
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');

        file.write_all(&data)?;
        if self.sync {
            file.sync_data()?;
        }
        Ok(())
    }

    fn stat(&self) -> StorageResult<Option<FileStat>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(FileStat {
                size: meta.len(),
                modified: meta.modified().ok(),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn lock_exclusive(&self) -> StorageResult<StoreLock> {
        self.ensure_parent()?;

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.sibling(LOCK_SUFFIX))?;
        lock_file.lock_exclusive()?;

        Ok(StoreLock::file(lock_file))
    }
}
