//! Word list and its file-backed cache
//!
//! [`Dictionary`] is an immutable, cheaply cloned list of candidate words.
//! [`DictionaryCache`] owns the source path and reloads the list when the
//! file's modification time changes. Readers only block while a reload is
//! swapping the contents in.

use crate::constraints::WORD_LEN;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Immutable word list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    words: Arc<[String]>,
}

impl Dictionary {
    /// Keep only words of exactly [`WORD_LEN`] alphabetic characters
    ///
    /// Words are trimmed and lowercased. File order is preserved.
    #[must_use]
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .filter_map(|w| normalize_word(w.as_ref()))
            .collect();
        Self {
            words: words.into(),
        }
    }

    /// Parse newline-delimited text
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_words(text.lines())
    }

    #[inline]
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `word` is a well-formed entry of this list
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        normalize_word(word).is_some_and(|w| self.words.iter().any(|entry| *entry == w))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.words.iter()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}

fn normalize_word(raw: &str) -> Option<String> {
    let word = raw.trim().to_lowercase();
    (word.chars().count() == WORD_LEN && word.chars().all(char::is_alphabetic)).then_some(word)
}

#[derive(Debug, Default)]
struct Loaded {
    modified: Option<SystemTime>,
    contents: Dictionary,
    initialized: bool,
}

impl Loaded {
    fn is_fresh(&self, modified: Option<SystemTime>) -> bool {
        if !self.initialized || self.modified != modified {
            return false;
        }
        // a missing file stays empty; an empty list read from disk is retried
        modified.is_none() || !self.contents.is_empty()
    }
}

/// File-backed dictionary with staleness detection
#[derive(Debug)]
pub struct DictionaryCache {
    path: PathBuf,
    state: RwLock<Loaded>,
}

impl DictionaryCache {
    /// Create cache for `path`; nothing is read until first use
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: RwLock::new(Loaded::default()),
        }
    }

    /// Source file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time of the loaded contents
    #[must_use]
    pub fn loaded_at(&self) -> Option<SystemTime> {
        self.state.read().modified
    }

    /// Current contents without checking the file
    #[must_use]
    pub fn current(&self) -> Dictionary {
        self.state.read().contents.clone()
    }

    /// Reload if the file changed since the last load
    ///
    /// A missing file yields an empty dictionary. An empty list is always
    /// re-read, so a dictionary dropped in place is picked up on the next
    /// call. Returns whether the contents were replaced.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read
    pub fn refresh_if_stale(&self) -> Result<bool, DictionaryError> {
        let modified = match std::fs::metadata(&self.path) {
            Ok(meta) => Some(meta.modified().map_err(|e| DictionaryError::io(&self.path, e))?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(DictionaryError::io(&self.path, e)),
        };

        if self.state.read().is_fresh(modified) {
            return Ok(false);
        }

        let contents = match modified {
            Some(_) => {
                let text = std::fs::read_to_string(&self.path)
                    .map_err(|e| DictionaryError::io(&self.path, e))?;
                Dictionary::parse(&text)
            }
            None => Dictionary::default(),
        };

        let mut state = self.state.write();
        if state.is_fresh(modified) {
            return Ok(false);
        }
        if contents.is_empty() {
            // re-read on every call until words appear
            tracing::debug!(path = %self.path.display(), "dictionary empty");
        } else {
            tracing::info!(
                path = %self.path.display(),
                words = contents.len(),
                "dictionary loaded"
            );
        }
        state.modified = modified;
        state.contents = contents;
        state.initialized = true;
        Ok(true)
    }

    /// Refreshed contents, falling back to what is loaded on read errors
    #[must_use]
    pub fn snapshot(&self) -> Dictionary {
        if let Err(e) = self.refresh_if_stale() {
            tracing::warn!(error = %e, "dictionary refresh failed, serving cached words");
        }
        self.current()
    }
}

/// Errors reading the dictionary source
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// Filesystem failure
    #[error("cannot read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DictionaryError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
