//! Statebook Core
//!
//! Ties the document store, the patch guard and the word solver to one
//! statebook file.
//!
//! # Core Concepts
//!
//! - [`Statebook`]: locked load → change → save over one document
//! - [`StatebookConfig`]: file locations, read from TOML and the environment
//! - [`CandidateCountMeter`]: the `candidate_count` metric evidence is checked against
//! - [`DocumentLocks`]: per-file write serialization
//!
//! # Example
//!
//! ```rust,ignore
//! use statebook_core::{init_tracing, LogFormat, Statebook, StatebookConfig};
//!
//! let config = StatebookConfig::load("statebook.toml")?.with_env_overrides();
//! init_tracing(&config.log_filter, LogFormat::Pretty);
//!
//! let book = Statebook::new(config);
//! let report = book.apply_proposal(&proposal)?;
//! assert!(report.applied || report.rejection.is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod locks;
mod meter;
mod statebook;
mod telemetry;

pub use config::{ConfigError, StatebookConfig, DICTIONARY_ENV};
pub use error::{StatebookError, StatebookResult};
pub use locks::DocumentLocks;
pub use meter::{CandidateCountMeter, CANDIDATE_COUNT};
pub use statebook::{PatchReport, Statebook};
pub use telemetry::{init_tracing, LogFormat};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
