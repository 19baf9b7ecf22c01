//! Solver project defaults
//!
//! A document whose `/project/id` is [`SOLVER_PROJECT_ID`] gets its goal,
//! deliverable, success checks and empty solver state filled in when absent.
//! Present values are never overwritten.

use crate::constraints::{Constraints, CONSTRAINTS_POINTER};
use crate::session::{HISTORY_POINTER, LAST_GUESS_POINTER};
use serde_json::{json, Value};
use statebook_document::StateDocument;

/// Project id that activates the solver
pub const SOLVER_PROJECT_ID: &str = "wordle";

pub const DEFAULT_GOAL: &str = "Solve today's Wordle in ≤ 4 guesses.";
pub const DEFAULT_DELIVERABLE: &str = "Legal 5-letter guesses until solved.";
pub const DEFAULT_SUCCESS_CHECKS: [&str; 3] = ["valid_word", "respects_constraints", "novel_guess"];

/// Whether the solver owns this document
#[inline]
#[must_use]
pub fn is_solver_project(document: &StateDocument) -> bool {
    document.project_id() == SOLVER_PROJECT_ID
}

/// Defaults missing from a solver document, as pointer/value pairs
///
/// Empty for documents of other projects and for fully bootstrapped ones.
#[must_use]
pub fn bootstrap_entries(document: &StateDocument) -> Vec<(&'static str, Value)> {
    if !is_solver_project(document) {
        return Vec::new();
    }
    let defaults = [
        ("/project/goal", json!(DEFAULT_GOAL)),
        ("/project/deliverable", json!(DEFAULT_DELIVERABLE)),
        ("/project/success_checks", json!(DEFAULT_SUCCESS_CHECKS)),
        (CONSTRAINTS_POINTER, Constraints::new().to_value()),
        (HISTORY_POINTER, json!([])),
        (LAST_GUESS_POINTER, json!("")),
    ];
    defaults
        .into_iter()
        .filter(|(pointer, _)| document.get_pointer(pointer).is_none())
        .collect()
}
