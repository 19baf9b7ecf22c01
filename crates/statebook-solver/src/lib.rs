//! Statebook Solver
//!
//! Narrows a word list under accumulated feedback and ranks what is left.
//!
//! # Core Concepts
//!
//! - [`Constraints`]: positional and per-letter restrictions
//! - [`DictionaryCache`]: word list reloaded when its file changes
//! - [`CandidateStats`]: letter statistics behind the information-gain score
//! - [`Ruleset`]: blend weights and data-defined heuristic rules
//! - [`SolverSession`]: constraints plus history; produces [`Suggestion`]s
//!
//! # Example
//!
//! ```rust,ignore
//! use statebook_solver::{DictionaryCache, Ruleset, SolverSession};
//!
//! let cache = DictionaryCache::new("dictionary.txt");
//! let mut session = SolverSession::from_document(&document);
//! session.constraints_mut().exclude('a');
//! let suggestion = session.suggest(&cache.snapshot(), &Ruleset::default());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod constraints;
mod dictionary;
mod feedback;
mod heuristics;
mod project;
mod scoring;
mod session;

pub use constraints::{Constraints, CONSTRAINTS_POINTER, WORD_LEN};
pub use dictionary::{Dictionary, DictionaryCache, DictionaryError};
pub use feedback::{ConstraintMutation, FeedbackParser};
pub use heuristics::{Rule, RuleConditions, RuleScale, Ruleset, Weights};
pub use project::{
    bootstrap_entries, is_solver_project, DEFAULT_DELIVERABLE, DEFAULT_GOAL,
    DEFAULT_SUCCESS_CHECKS, SOLVER_PROJECT_ID,
};
pub use scoring::{score_information_gain, CandidateStats};
pub use session::{GuessRecord, HistoryEntry, SolverSession, Suggestion, HISTORY_POINTER, LAST_GUESS_POINTER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
