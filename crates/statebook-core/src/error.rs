//! Facade errors
//!
//! Patch rejections are not errors at this level: they are reported in a
//! [`PatchReport`](crate::PatchReport). [`StatebookError::Patch`] only surfaces
//! from the internal solver writes.

use crate::config::ConfigError;
use statebook_document::StoreError;
use statebook_guard::PatchError;
use statebook_solver::DictionaryError;

/// Errors from statebook operations
#[derive(Debug, thiserror::Error)]
pub enum StatebookError {
    #[error("storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("patch failed: {0}")]
    Patch(#[from] PatchError),

    #[error("dictionary unavailable: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("configuration failed: {0}")]
    Config(#[from] ConfigError),
}

impl StatebookError {
    /// Whether the disk is the problem
    #[inline]
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Io { .. })
                | Self::Dictionary(DictionaryError::Io { .. })
                | Self::Config(ConfigError::Io { .. })
        )
    }
}

/// Result alias for statebook operations
pub type StatebookResult<T> = Result<T, StatebookError>;
