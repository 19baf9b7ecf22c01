//! Patch operations and proposals
//!
//! Provides [`PatchOperation`], one `add`/`replace` instruction against a
//! state document, and [`PatchProposal`], the unit an external generator
//! submits: a list of operations plus optional evidence.

use crate::evidence::Evidence;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use statebook_document::PointerPath;
use std::fmt;

/// Operation kind
///
/// Unknown kinds are kept verbatim so the applier can reject them with
/// their original name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatchOpKind {
    /// Insert into a sequence, or set when the target is not a sequence slot
    Add,
    /// Set the value at the target
    Replace,
    /// Anything else
    Other(String),
}

impl PatchOpKind {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for PatchOpKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "add" => Self::Add,
            "replace" => Self::Replace,
            _ => Self::Other(name),
        }
    }
}

impl From<PatchOpKind> for String {
    fn from(kind: PatchOpKind) -> Self {
        match kind {
            PatchOpKind::Add => "add".to_string(),
            PatchOpKind::Replace => "replace".to_string(),
            PatchOpKind::Other(name) => name,
        }
    }
}

impl fmt::Display for PatchOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instruction targeting a path within a state document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// Operation kind
    pub op: PatchOpKind,
    /// Slash-delimited target path
    pub path: String,
    /// Payload, `null` when omitted
    #[serde(default)]
    pub value: Value,
}

impl PatchOperation {
    /// Create an `add` operation
    #[must_use]
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Add,
            path: path.into(),
            value,
        }
    }

    /// Create a `replace` operation
    #[must_use]
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Replace,
            path: path.into(),
            value,
        }
    }

    /// Parsed target
    #[inline]
    #[must_use]
    pub fn pointer(&self) -> PointerPath {
        PointerPath::parse(&self.path)
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.path)
    }
}

/// Operations plus the evidence backing them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchProposal {
    /// Operations, applied in order
    #[serde(default)]
    pub patch: Vec<PatchOperation>,
    /// Claimed effect of the whole patch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    /// Other proposal fields (e.g. a reply for the user)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PatchProposal {
    /// Proposal without evidence
    #[must_use]
    pub fn new(patch: Vec<PatchOperation>) -> Self {
        Self {
            patch,
            evidence: None,
            extra: Map::new(),
        }
    }

    /// Attach evidence
    #[must_use]
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// Whether the proposal carries non-empty evidence
    #[must_use]
    pub fn has_evidence(&self) -> bool {
        self.evidence.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Number of operations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.patch.len()
    }

    /// Whether there is nothing to apply
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patch.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn op_kind_keeps_unknown_names() {
        let op: PatchOperation =
            serde_json::from_value(json!({"op": "remove", "path": "/state/x"})).unwrap();
        assert_eq!(op.op, PatchOpKind::Other("remove".to_string()));
        assert_eq!(op.value, Value::Null);
        assert_eq!(op.to_string(), "remove /state/x");
    }

    #[test]
    fn proposal_parses_wire_form() {
        let proposal: PatchProposal = serde_json::from_value(json!({
            "reply": "narrowed it down",
            "patch": [
                {"op": "replace", "path": "/state/next_action", "value": "explore"},
                {"op": "add", "path": "/state/history/-", "value": "crane"}
            ],
            "evidence": {"checkerDeltas": {"candidate_count": -3}}
        }))
        .unwrap();
        assert_eq!(proposal.len(), 2);
        assert_eq!(proposal.patch[1].op, PatchOpKind::Add);
        assert!(proposal.has_evidence());
        assert_eq!(proposal.extra.get("reply"), Some(&json!("narrowed it down")));
    }

    #[test]
    fn proposal_defaults_when_fields_missing() {
        let proposal: PatchProposal = serde_json::from_value(json!({})).unwrap();
        assert!(proposal.is_empty());
        assert!(!proposal.has_evidence());
    }

    #[test]
    fn empty_evidence_object_is_not_evidence() {
        let proposal: PatchProposal =
            serde_json::from_value(json!({"patch": [], "evidence": {}})).unwrap();
        assert!(proposal.evidence.is_some());
        assert!(!proposal.has_evidence());
    }
}
