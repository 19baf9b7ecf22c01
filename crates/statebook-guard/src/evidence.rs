//! Evidence and its verification
//!
//! # Core Concepts
//!
//! - [`MetricSnapshot`]: metric name to value, measured on one document
//! - [`Evidence`]: the proposer's claimed metric deltas
//! - [`EvidenceVerifier`]: checks that claimed and observed deltas point the
//!   same way
//!
//! Only the direction of change is checked. A claim of `-5` against an
//! observed `-28` passes; a claim of `+5` against the same observation fails.

use crate::error::PatchError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const DELTA_KEYS: [&str; 2] = ["checker_deltas", "checkerDeltas"];

/// Metric values measured on one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSnapshot(BTreeMap<String, f64>);

impl MetricSnapshot {
    /// Empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.0.insert(metric.into(), value);
        self
    }

    /// Record a metric
    pub fn insert(&mut self, metric: impl Into<String>, value: f64) {
        self.0.insert(metric.into(), value);
    }

    /// Value of a metric
    #[inline]
    #[must_use]
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.0.get(metric).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Metrics in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for MetricSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Claimed effect of a patch
///
/// Accepts `checker_deltas` or `checkerDeltas`; non-numeric deltas are
/// dropped and other fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evidence {
    /// Claimed signed change per metric
    pub checker_deltas: BTreeMap<String, f64>,
    /// Other evidence fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Evidence {
    /// Evidence claiming the given deltas
    #[must_use]
    pub fn new(checker_deltas: BTreeMap<String, f64>) -> Self {
        Self {
            checker_deltas,
            extra: Map::new(),
        }
    }

    /// Builder-style claim
    #[must_use]
    pub fn claim(mut self, metric: impl Into<String>, delta: f64) -> Self {
        self.checker_deltas.insert(metric.into(), delta);
        self
    }

    /// Deltas an honest proposer would claim for `before` → `after`
    ///
    /// Covers the union of metric names; a metric missing on one side
    /// counts as zero there.
    #[must_use]
    pub fn from_snapshots(before: &MetricSnapshot, after: &MetricSnapshot) -> Self {
        let mut deltas = BTreeMap::new();
        for (metric, _) in before.iter().chain(after.iter()) {
            if deltas.contains_key(metric) {
                continue;
            }
            let delta = after.get(metric).unwrap_or(0.0) - before.get(metric).unwrap_or(0.0);
            deltas.insert(metric.to_string(), delta);
        }
        Self::new(deltas)
    }

    /// No claims and no other content
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checker_deltas.is_empty() && self.extra.is_empty()
    }

    /// Parse an evidence value leniently
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Self::default(),
            other => {
                let mut extra = Map::new();
                extra.insert("value".to_string(), other.clone());
                return Self {
                    checker_deltas: BTreeMap::new(),
                    extra,
                };
            }
        };

        let checker_deltas = DELTA_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_object))
            .map(|deltas| {
                deltas
                    .iter()
                    .filter_map(|(k, v)| v.as_f64().map(|d| (k.clone(), d)))
                    .collect()
            })
            .unwrap_or_default();

        let extra = map
            .iter()
            .filter(|(k, _)| !DELTA_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            checker_deltas,
            extra,
        }
    }
}

impl<'de> Deserialize<'de> for Evidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Reconciles claimed deltas against measured snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceVerifier;

impl EvidenceVerifier {
    /// Check every claimed delta against `after - before`
    ///
    /// Returns informational notes; empty when nothing was claimed.
    ///
    /// # Errors
    /// - [`PatchError::UnknownMetric`] if a claimed metric is missing from
    ///   either snapshot
    /// - [`PatchError::EvidenceMismatch`] if claimed and observed changes have
    ///   strictly opposite signs
    pub fn verify(
        &self,
        before: &MetricSnapshot,
        after: &MetricSnapshot,
        claimed: &BTreeMap<String, f64>,
    ) -> Result<Vec<String>, PatchError> {
        if claimed.is_empty() {
            return Ok(Vec::new());
        }

        for (metric, &claim) in claimed {
            let (Some(b), Some(a)) = (before.get(metric), after.get(metric)) else {
                return Err(PatchError::UnknownMetric {
                    metric: metric.clone(),
                });
            };
            let observed = a - b;
            if opposite_signs(claim, observed) {
                return Err(PatchError::EvidenceMismatch {
                    metric: metric.clone(),
                    claimed: claim,
                    observed,
                });
            }
            tracing::trace!(%metric, claim, observed, "claim agrees with measurement");
        }

        let metrics: Vec<&str> = claimed.keys().map(String::as_str).collect();
        Ok(vec![format!("evidence verified: {}", metrics.join(", "))])
    }
}

fn opposite_signs(claimed: f64, observed: f64) -> bool {
    (observed > 0.0 && claimed < 0.0) || (observed < 0.0 && claimed > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshots() -> (MetricSnapshot, MetricSnapshot) {
        (
            MetricSnapshot::new().with("candidates", 40.0),
            MetricSnapshot::new().with("candidates", 12.0),
        )
    }

    #[test]
    fn same_direction_verifies() {
        let (before, after) = snapshots();
        let claim = Evidence::default().claim("candidates", -5.0);
        let notes = EvidenceVerifier
            .verify(&before, &after, &claim.checker_deltas)
            .unwrap();
        assert_eq!(notes, vec!["evidence verified: candidates".to_string()]);
    }

    #[test]
    fn opposite_direction_fails() {
        let (before, after) = snapshots();
        let claim = Evidence::default().claim("candidates", 5.0);
        let err = EvidenceVerifier
            .verify(&before, &after, &claim.checker_deltas)
            .unwrap_err();
        match err {
            PatchError::EvidenceMismatch {
                metric,
                claimed,
                observed,
            } => {
                assert_eq!(metric, "candidates");
                assert!((claimed - 5.0).abs() < f64::EPSILON);
                assert!((observed + 28.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_never_conflicts() {
        let (before, after) = snapshots();
        let claim = Evidence::default().claim("candidates", 0.0);
        assert!(EvidenceVerifier
            .verify(&before, &after, &claim.checker_deltas)
            .is_ok());

        let flat = MetricSnapshot::new().with("candidates", 40.0);
        let claim = Evidence::default().claim("candidates", 7.0);
        assert!(EvidenceVerifier
            .verify(&before, &flat, &claim.checker_deltas)
            .is_ok());
    }

    #[test]
    fn unknown_metric_fails() {
        let (before, _) = snapshots();
        let after = MetricSnapshot::new();
        let claim = Evidence::default().claim("candidates", -1.0);
        let err = EvidenceVerifier
            .verify(&before, &after, &claim.checker_deltas)
            .unwrap_err();
        assert!(matches!(err, PatchError::UnknownMetric { metric } if metric == "candidates"));
    }

    #[test]
    fn nothing_claimed_yields_no_notes() {
        let (before, after) = snapshots();
        let notes = EvidenceVerifier
            .verify(&before, &after, &BTreeMap::new())
            .unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn from_snapshots_covers_union() {
        let before = MetricSnapshot::new().with("a", 3.0).with("b", 1.0);
        let after = MetricSnapshot::new().with("a", 1.0).with("c", 4.0);
        let evidence = Evidence::from_snapshots(&before, &after);
        assert_eq!(evidence.checker_deltas.get("a"), Some(&-2.0));
        assert_eq!(evidence.checker_deltas.get("b"), Some(&-1.0));
        assert_eq!(evidence.checker_deltas.get("c"), Some(&4.0));
    }

    #[test]
    fn evidence_parses_both_key_styles() {
        let snake: Evidence =
            serde_json::from_value(json!({"checker_deltas": {"n": -1, "bad": "x"}})).unwrap();
        let camel: Evidence =
            serde_json::from_value(json!({"checkerDeltas": {"n": -1}, "why": "pruned"})).unwrap();
        assert_eq!(snake.checker_deltas, camel.checker_deltas);
        assert_eq!(camel.extra.get("why"), Some(&json!("pruned")));
        assert!(Evidence::from_value(&json!({})).is_empty());
        assert!(!Evidence::from_value(&json!("trust me")).is_empty());
    }
}
