//! Statebook Documents
//!
//! The shared state record that every other statebook crate reads and
//! mutates.
//!
//! # Core Concepts
//!
//! - [`StateDocument`]: JSON tree with a mapping root
//! - [`PointerPath`]: slash-delimited addressing (`/state/history/-`)
//! - [`DocumentHash`]: Blake3 fingerprint of the canonical encoding
//! - [`StateStore`]: whole-file load/save with a refreshed `meta.updated`
//!
//! # Example
//!
//! ```rust,ignore
//! use statebook_document::{StateStore, PointerPath};
//!
//! let store = StateStore::new("statebook.json");
//! let mut document = store.load()?;
//! let goal = document.get(&PointerPath::parse("/project/goal"));
//! store.save(&mut document)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod hash;
mod pointer;
mod records;
mod store;

pub use document::{DocumentError, StateDocument, META_KEY, UPDATED_KEY};
pub use hash::{DocumentHash, HashError};
pub use pointer::{index_segment, PointerError, PointerPath, APPEND_MARKER};
pub use records::ProjectInfo;
pub use store::{StateStore, StoreError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
