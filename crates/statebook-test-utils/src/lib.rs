//! Testing utilities for the statebook workspace
//!
//! Shared fixtures: a small word list, governed documents and proposal
//! builders.

#![allow(missing_docs)]

use serde_json::{json, Value};
use statebook_document::{StateDocument, StateStore};
use statebook_guard::{Evidence, PatchOperation, PatchProposal};
use statebook_solver::Dictionary;
use std::path::{Path, PathBuf};

/// Small dictionary with shared prefixes and repeated letters
pub const SAMPLE_WORDS: &[&str] = &[
    "crane", "slate", "crisp", "crust", "adieu", "audio", "geese", "eerie", "tarot", "abbey",
    "mound", "pique", "lymph", "fjord", "shard", "stare", "tears", "rates", "aster", "crate",
];

#[must_use]
pub fn sample_dictionary() -> Dictionary {
    Dictionary::from_words(SAMPLE_WORDS)
}

/// Write [`SAMPLE_WORDS`] to `dir/dictionary.txt`, one per line
pub fn write_dictionary(dir: &Path) -> PathBuf {
    let path = dir.join("dictionary.txt");
    std::fs::write(&path, SAMPLE_WORDS.join("\n")).unwrap();
    path
}

/// Solver document whose policy lets `/state/*` through and guards the
/// constraints behind evidence
#[must_use]
pub fn wordle_document() -> StateDocument {
    StateDocument::new(json!({
        "project": {"id": "wordle"},
        "kernel": {"policy": {
            "allowed_paths": ["/state/*", "/decisions/-"],
            "proof_required": [{"path": "/state/constraints/*"}]
        }},
        "state": {},
        "decisions": []
    }))
    .unwrap()
}

/// Document of another project with the given policy section
#[must_use]
pub fn governed_document(policy: Value) -> StateDocument {
    StateDocument::new(json!({
        "project": {"id": "demo"},
        "kernel": {"policy": policy},
        "state": {"items": []},
        "decisions": []
    }))
    .unwrap()
}

/// Persist `document` at `dir/statebook.json`
pub fn write_statebook(dir: &Path, document: &StateDocument) -> PathBuf {
    let path = dir.join("statebook.json");
    let mut document = document.clone();
    StateStore::new(&path).save(&mut document).unwrap();
    path
}

/// Proposal replacing `must_exclude` with the letters of `letters`
#[must_use]
pub fn exclude_proposal(letters: &str) -> PatchProposal {
    let letters: Vec<String> = letters.chars().map(String::from).collect();
    PatchProposal::new(vec![PatchOperation::replace(
        "/state/constraints/must_exclude",
        json!(letters),
    )])
}

/// Proposal appending one decision record
#[must_use]
pub fn decision_proposal(text: &str) -> PatchProposal {
    PatchProposal::new(vec![PatchOperation::add(
        "/decisions/-",
        json!({"decision": text}),
    )])
}

/// Evidence claiming a single delta
#[must_use]
pub fn claim(metric: &str, delta: f64) -> Evidence {
    Evidence::default().claim(metric, delta)
}
