//! Path policies
//!
//! A [`Policy`] lists the path patterns a patch may touch and the subset of
//! patterns that require accompanying evidence.
//!
//! Pattern grammar:
//! - `/state/*` matches every path starting with `/state/`
//! - anything else matches only itself, character for character

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use statebook_document::StateDocument;
use std::fmt;

/// Where the governing policy lives inside a state document
pub const POLICY_POINTER: &str = "/kernel/policy";

const ALLOWED_KEYS: [&str; 2] = ["allowed_paths", "allowedPaths"];
const PROOF_KEYS: [&str; 3] = ["proof_required", "proofRequired", "proofRequiredPaths"];

/// One path pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PathPattern(String);

impl PathPattern {
    /// Create pattern
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Pattern text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a `/*` prefix pattern
    #[inline]
    #[must_use]
    pub fn is_prefix(&self) -> bool {
        self.0.ends_with("/*")
    }

    /// Check whether `path` satisfies the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self.0.strip_suffix('*') {
            Some(prefix) if self.is_prefix() => path.starts_with(prefix),
            _ => path == self.0,
        }
    }
}

impl From<String> for PathPattern {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for PathPattern {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<PathPattern> for String {
    fn from(pattern: PathPattern) -> Self {
        pattern.0
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry in the proof-required list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofRequirement {
    /// Guarded pattern
    pub path: PathPattern,
    /// Other fields of the entry (e.g. which checker proves it)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProofRequirement {
    /// Requirement with no extra fields
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathPattern>) -> Self {
        Self {
            path: path.into(),
            extra: Map::new(),
        }
    }

    /// Whether the requirement covers `path`
    ///
    /// Besides the usual pattern grammar, a pattern ending in `/-` guards
    /// the sequence it names and everything below it.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        match self.path.as_str().strip_suffix("/-") {
            Some(sequence) => {
                path == sequence
                    || path
                        .strip_prefix(sequence)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            None => self.path.matches(path),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(raw) => Some(Self::new(raw.as_str())),
            Value::Object(entry) => {
                let path = entry.get("path")?.as_str()?;
                let extra = entry
                    .iter()
                    .filter(|(k, _)| k.as_str() != "path")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Some(Self {
                    path: PathPattern::new(path),
                    extra,
                })
            }
            _ => None,
        }
    }
}

/// Allowed and proof-required path patterns
///
/// Deserialization is lenient: unknown keys land in `extra`, malformed
/// entries are skipped, and a non-mapping input yields the deny-all policy.
/// Both the on-disk snake_case keys and camelCase keys are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Policy {
    /// Patterns a patch may touch
    pub allowed_paths: Vec<PathPattern>,
    /// Patterns that also need evidence
    pub proof_required: Vec<ProofRequirement>,
    /// Unrecognized policy fields (thresholds, locks, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Policy {
    /// Policy that allows nothing
    #[inline]
    #[must_use]
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// Add an allowed pattern
    #[must_use]
    pub fn allow(mut self, pattern: impl Into<PathPattern>) -> Self {
        self.allowed_paths.push(pattern.into());
        self
    }

    /// Add a proof-required pattern
    #[must_use]
    pub fn require_proof(mut self, pattern: impl Into<PathPattern>) -> Self {
        self.proof_required.push(ProofRequirement::new(pattern));
        self
    }

    /// Parse a policy document value
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::deny_all();
        };

        let allowed_paths = first_array(map, &ALLOWED_KEYS)
            .iter()
            .filter_map(Value::as_str)
            .map(PathPattern::new)
            .collect();

        let proof_required = first_array(map, &PROOF_KEYS)
            .iter()
            .filter_map(ProofRequirement::from_value)
            .collect();

        let extra = map
            .iter()
            .filter(|(k, _)| !ALLOWED_KEYS.contains(&k.as_str()) && !PROOF_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            allowed_paths,
            proof_required,
            extra,
        }
    }

    /// Policy stored at [`POLICY_POINTER`], deny-all when absent
    #[must_use]
    pub fn from_document(document: &StateDocument) -> Self {
        document
            .get_pointer(POLICY_POINTER)
            .map_or_else(Self::deny_all, Self::from_value)
    }

    /// Whether a patch may touch `path`
    #[must_use]
    pub fn allows(&self, path: &str) -> bool {
        self.allowed_paths.iter().any(|p| p.matches(path))
    }

    /// Whether touching `path` needs evidence
    #[must_use]
    pub fn requires_proof(&self, path: &str) -> bool {
        self.proof_required.iter().any(|r| r.covers(path))
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn first_array<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|k| map.get(*k).and_then(Value::as_array))
        .map_or(&[], Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefix_pattern_matches_descendants() {
        let p = PathPattern::new("/state/*");
        assert!(p.is_prefix());
        assert!(p.matches("/state/grs/score"));
        assert!(p.matches("/state/"));
        assert!(!p.matches("/state"));
        assert!(!p.matches("/statement/x"));
    }

    #[test]
    fn exact_pattern_matches_only_itself() {
        let p = PathPattern::new("/project/goal");
        assert!(!p.is_prefix());
        assert!(p.matches("/project/goal"));
        assert!(!p.matches("/project/goal/x"));
    }

    #[test]
    fn bare_star_is_exact() {
        let p = PathPattern::new("*");
        assert!(!p.is_prefix());
        assert!(p.matches("*"));
        assert!(!p.matches("/state/x"));
    }

    #[test]
    fn append_marker_requirement_guards_sequence() {
        let req = ProofRequirement::new("/logs/decisions/-");
        assert!(req.covers("/logs/decisions/-"));
        assert!(req.covers("/logs/decisions/3"));
        assert!(req.covers("/logs/decisions"));
        assert!(!req.covers("/logs/decisions_archive/0"));
        assert!(!req.covers("/logs/other"));
    }

    #[test]
    fn policy_from_snake_case_document() {
        let policy = Policy::from_value(&json!({
            "allowed_paths": ["/state/*", "/temp/*"],
            "proof_required": [{"path": "/state/constraints/*", "checker": "candidate_count"}],
            "kernel_locked": true
        }));
        assert!(policy.allows("/state/grs"));
        assert!(!policy.allows("/kernel/policy"));
        assert!(policy.requires_proof("/state/constraints/greens"));
        assert_eq!(
            policy.proof_required[0].extra.get("checker"),
            Some(&json!("candidate_count"))
        );
        assert_eq!(policy.extra.get("kernel_locked"), Some(&json!(true)));
    }

    #[test]
    fn policy_from_camel_case_document() {
        let policy: Policy = serde_json::from_value(json!({
            "allowedPaths": ["/gaps/*"],
            "proofRequired": [{"path": "/gaps/critical"}, "/gaps/other", 7]
        }))
        .unwrap();
        assert!(policy.allows("/gaps/critical"));
        assert!(policy.requires_proof("/gaps/critical"));
        assert!(policy.requires_proof("/gaps/other"));
        assert_eq!(policy.proof_required.len(), 2);
    }

    #[test]
    fn policy_non_object_is_deny_all() {
        let policy = Policy::from_value(&json!("oops"));
        assert_eq!(policy, Policy::deny_all());
        assert!(!policy.allows("/state/x"));
    }

    #[test]
    fn policy_from_skeleton_document() {
        let policy = Policy::from_document(&StateDocument::skeleton());
        assert!(policy.allows("/logs/decisions/-"));
        assert!(!policy.allows("/kernel/policy"));
        assert!(policy.proof_required.is_empty());
        assert!(policy.extra.contains_key("thresholds"));
    }

    #[test]
    fn policy_serializes_to_snake_case() {
        let policy = Policy::deny_all().allow("/state/*").require_proof("/state/x");
        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(
            value,
            json!({"allowed_paths": ["/state/*"], "proof_required": [{"path": "/state/x"}]})
        );
        assert_eq!(Policy::from_value(&value), policy);
    }
}
