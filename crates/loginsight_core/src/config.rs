//! Store configuration.

use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the log directory.
pub const LOG_DIR_ENV: &str = "LOG_DIR";

/// Configuration for opening a log store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one file per category.
    pub log_dir: PathBuf,

    /// Page used when a query gives none, or an unusable one.
    pub default_page: usize,

    /// Page size used when a query gives none, or an unusable one.
    pub default_limit: usize,

    /// Refuse to load category files larger than this many bytes.
    pub max_file_size: Option<u64>,

    /// Whether to fsync on rewrite and append (safer but slower).
    pub sync_on_write: bool,

    /// Rewrite category files through their own inode instead of renaming
    /// a temporary file over them. Needed when other processes keep a log
    /// file open for appending across deletions.
    pub rewrite_in_place: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            default_page: 1,
            default_limit: 50,
            max_file_size: None,
            sync_on_write: true,
            rewrite_in_place: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration whose log directory comes from `LOG_DIR`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_log_dir_var(std::env::var_os(LOG_DIR_ENV))
    }

    fn from_log_dir_var(value: Option<OsString>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(dir) => Self::default().log_dir(dir),
            None => Self::default(),
        }
    }

    /// Sets the log directory.
    #[must_use]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Sets the default page.
    #[must_use]
    pub const fn default_page(mut self, page: usize) -> Self {
        self.default_page = page;
        self
    }

    /// Sets the default page size.
    #[must_use]
    pub const fn default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Sets the maximum file size loaded by queries and deletions.
    #[must_use]
    pub const fn max_file_size(mut self, size: Option<u64>) -> Self {
        self.max_file_size = size;
        self
    }

    /// Sets whether writes are fsynced.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether deletions rewrite files in place.
    #[must_use]
    pub const fn rewrite_in_place(mut self, value: bool) -> Self {
        self.rewrite_in_place = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
        assert_eq!(config.default_page, 1);
        assert_eq!(config.default_limit, 50);
        assert!(config.max_file_size.is_none());
        assert!(config.sync_on_write);
        assert!(!config.rewrite_in_place);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .log_dir("/var/log/insight")
            .default_limit(20)
            .max_file_size(Some(1024))
            .sync_on_write(false)
            .rewrite_in_place(true);

        assert_eq!(config.log_dir, PathBuf::from("/var/log/insight"));
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.max_file_size, Some(1024));
        assert!(!config.sync_on_write);
        assert!(config.rewrite_in_place);
    }

    #[test]
    fn log_dir_from_env_value() {
        let config = Config::from_log_dir_var(Some(OsString::from("/tmp/logs")));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));

        let config = Config::from_log_dir_var(Some(OsString::new()));
        assert_eq!(config.log_dir, PathBuf::from("./logs"));

        let config = Config::from_log_dir_var(None);
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
    }
}
