//! Category registry.
//!
//! The set of categories is fixed for the lifetime of the process. Each
//! category maps to one file inside the configured log directory.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named partition of the log store, backed by one file.
///
/// Ordering follows registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// General application events reported by clients.
    General,
    /// Login attempts.
    Login,
    /// Token usage records.
    Tokens,
    /// The service's own log.
    App,
}

impl Category {
    /// Every category, in registry order.
    pub const ALL: [Category; 4] = [
        Category::General,
        Category::Login,
        Category::Tokens,
        Category::App,
    ];

    /// Resolves a category name.
    ///
    /// Names must match exactly.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCategory`] for any unregistered name.
    pub fn resolve(name: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| CoreError::invalid_category(name))
    }

    /// Returns the registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Login => "login",
            Self::Tokens => "tokens",
            Self::App => "app",
        }
    }

    /// Returns the backing file name within the log directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::General => "general.log",
            Self::Login => "login.log",
            Self::Tokens => "tokens.log",
            Self::App => "app.log",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known() {
        assert_eq!(Category::resolve("general").unwrap(), Category::General);
        assert_eq!("tokens".parse::<Category>().unwrap(), Category::Tokens);
        assert_eq!(Category::Login.file_name(), "login.log");
    }

    #[test]
    fn resolve_is_exact() {
        for name in ["General", " app", "audit", ""] {
            let err = Category::resolve(name).unwrap_err();
            assert!(matches!(err, CoreError::InvalidCategory { .. }), "{name}");
        }
    }

    #[test]
    fn index_matches_registry_order() {
        for (i, category) in Category::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&Category::Tokens).unwrap();
        assert_eq!(json, "\"tokens\"");
        assert_eq!(Category::App.to_string(), "app");
    }
}
