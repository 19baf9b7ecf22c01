//! Whole-file persistence for state documents
//!
//! The document is read fully into memory and rewritten fully on every save.
//! Saves go through a sibling temp file and an atomic rename, so readers see
//! either the old or the new file and never a partial write.

use crate::document::{DocumentError, StateDocument};
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File-backed document store
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create store for `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Key identifying this document for write serialization
    #[must_use]
    pub fn key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Load the document
    ///
    /// A missing file yields [`StateDocument::skeleton`]. So does a file that
    /// does not parse as a JSON mapping; that case is logged.
    ///
    /// # Errors
    /// Returns error on I/O failures other than "not found"
    pub fn load(&self) -> Result<StateDocument, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no statebook on disk, using skeleton");
                return Ok(StateDocument::skeleton());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        match StateDocument::from_json_str(text.trim_start_matches('\u{feff}')) {
            Ok(document) => Ok(document),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable statebook, using skeleton");
                Ok(StateDocument::skeleton())
            }
        }
    }

    /// Stamp `meta.updated` and rewrite the file
    ///
    /// # Errors
    /// Returns error if the parent directory cannot be created or the file
    /// cannot be written
    pub fn save(&self, document: &mut StateDocument) -> Result<(), StoreError> {
        document.stamp_updated(Utc::now());
        let text = document.to_json_pretty()?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            hash = %document.hash().short(),
            "statebook saved"
        );
        Ok(())
    }

    /// Raw file bytes, `None` if the file does not exist
    ///
    /// # Errors
    /// Returns error on I/O failures other than "not found"
    pub fn read_raw(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}

/// Errors during load/save
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding failure
    #[error("document error: {0}")]
    Document(#[from] DocumentError),
}

impl StoreError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
