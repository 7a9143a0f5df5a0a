//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing file does not hold UTF-8 text.
    #[error("file is not valid UTF-8: {}", path.display())]
    InvalidUtf8 {
        /// Path of the offending file.
        path: PathBuf,
    },
}
