//! Typed views over well-known document sections

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `/project` section
///
/// Unrecognized keys are kept in `extra` so a read-modify-write cycle never
/// drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    /// Project identifier (selects solver modules)
    pub id: String,
    /// What the project is trying to achieve
    pub goal: String,
    /// What counts as output
    pub deliverable: String,
    /// Named checks a deliverable must pass
    pub success_checks: Vec<String>,
    /// Unrecognized fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectInfo {
    /// Whether the project id matches `id`
    #[inline]
    #[must_use]
    pub fn is(&self, id: &str) -> bool {
        self.id == id
    }
}
