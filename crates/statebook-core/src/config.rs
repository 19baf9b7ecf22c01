//! Statebook configuration
//!
//! Paths to the statebook, the dictionary and the heuristics file, plus the
//! default log filter. Read from TOML; every field is optional.
//!
//! ```toml
//! statebook_path = "data/statebook.json"
//! dictionary_path = "data/words.txt"
//! ruleset_path = "data/heuristics.json"
//! log_filter = "statebook_core=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides [`StatebookConfig::dictionary_path`]
pub const DICTIONARY_ENV: &str = "WORDLE_DICT_FILE";

/// Where the statebook and its companions live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatebookConfig {
    /// JSON state document
    pub statebook_path: PathBuf,
    /// Newline-separated word list
    pub dictionary_path: PathBuf,
    /// Heuristic weights and rules (JSON)
    pub ruleset_path: PathBuf,
    /// Filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for StatebookConfig {
    fn default() -> Self {
        Self {
            statebook_path: PathBuf::from("statebook.json"),
            dictionary_path: PathBuf::from("dictionary.txt"),
            ruleset_path: PathBuf::from("heuristics.json"),
            log_filter: "info".to_string(),
        }
    }
}

impl StatebookConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_statebook_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.statebook_path = path.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_dictionary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary_path = path.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_ruleset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ruleset_path = path.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse TOML; absent keys keep their defaults
    ///
    /// # Errors
    /// Returns error on malformed TOML or mistyped fields
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; blank values are ignored
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DICTIONARY_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(path = %path, "dictionary path overridden from environment");
            self.dictionary_path = PathBuf::from(path.trim());
        }
        self
    }
}

/// Errors while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
