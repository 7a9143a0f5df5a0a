//! Error types for LogInsight core.

use crate::category::Category;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in LogInsight core operations.
///
/// Malformed lines inside a log file are not errors; they are carried as
/// [`crate::LogLine::Opaque`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] loginsight_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Category name not in the registry.
    #[error("invalid log type: {name}")]
    InvalidCategory {
        /// The rejected name.
        name: String,
    },

    /// A date bound could not be parsed as a timestamp.
    #[error("invalid date: {value}")]
    InvalidDate {
        /// The rejected value.
        value: String,
    },

    /// Level name not recognised.
    #[error("invalid level: {name}")]
    InvalidLevel {
        /// The rejected name.
        name: String,
    },

    /// An appended event lacks a field its category requires.
    #[error("{category} events require {field}")]
    MissingField {
        /// The category appended to.
        category: Category,
        /// The missing field.
        field: &'static str,
    },

    /// The category file exceeds the configured size limit.
    #[error("{category} log is {size} bytes, over the {limit} byte limit")]
    FileTooLarge {
        /// The category whose file is too large.
        category: Category,
        /// Current file size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },
}

impl CoreError {
    /// Creates an invalid category error.
    pub fn invalid_category(name: impl Into<String>) -> Self {
        Self::InvalidCategory { name: name.into() }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Returns true if the error was caused by caller input rather than
    /// by the server side.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCategory { .. }
                | Self::InvalidDate { .. }
                | Self::InvalidLevel { .. }
                | Self::MissingField { .. }
        )
    }
}
