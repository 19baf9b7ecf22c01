//! One patch cycle: measure, apply, measure, verify
//!
//! The engine holds no state and takes no locks. Callers that share a
//! document between threads must run one cycle per document at a time.

use crate::applier::PatchApplier;
use crate::error::PatchError;
use crate::evidence::{EvidenceVerifier, MetricSnapshot};
use crate::patch::PatchProposal;
use crate::policy::Policy;
use statebook_document::StateDocument;

/// Measures a document
///
/// Implementations must be pure: the same document always yields the same
/// snapshot.
pub trait MetricSource {
    /// Snapshot of every metric this source knows about
    fn measure(&self, document: &StateDocument) -> MetricSnapshot;
}

impl<F> MetricSource for F
where
    F: Fn(&StateDocument) -> MetricSnapshot,
{
    fn measure(&self, document: &StateDocument) -> MetricSnapshot {
        self(document)
    }
}

/// Source that measures nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetrics;

impl MetricSource for NoMetrics {
    fn measure(&self, _document: &StateDocument) -> MetricSnapshot {
        MetricSnapshot::new()
    }
}

/// Result of a successful cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Patched copy of the input document
    pub document: StateDocument,
    /// Informational notes from verification
    pub notes: Vec<String>,
    /// Metrics before the patch
    pub before: MetricSnapshot,
    /// Metrics after the patch
    pub after: MetricSnapshot,
}

/// Runs patch cycles
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchEngine {
    applier: PatchApplier,
    verifier: EvidenceVerifier,
}

impl PatchEngine {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a cycle under an explicit policy
    ///
    /// # Errors
    /// Any [`PatchError`]; the input document is untouched in every case
    pub fn run<M>(
        &self,
        document: &StateDocument,
        proposal: &PatchProposal,
        policy: &Policy,
        meter: &M,
    ) -> Result<CycleOutcome, PatchError>
    where
        M: MetricSource + ?Sized,
    {
        tracing::debug!(ops = proposal.len(), evidence = proposal.has_evidence(), "patch cycle start");

        let before = meter.measure(document);
        let patched = self
            .applier
            .apply(document, &proposal.patch, policy, proposal.evidence.as_ref())
            .map_err(|e| {
                tracing::info!(kind = %e.kind(), error = %e, "patch rejected");
                e
            })?;
        let after = meter.measure(&patched);

        let notes = match &proposal.evidence {
            Some(evidence) => self
                .verifier
                .verify(&before, &after, &evidence.checker_deltas)
                .map_err(|e| {
                    tracing::info!(kind = %e.kind(), error = %e, "evidence rejected");
                    e
                })?,
            None => Vec::new(),
        };

        tracing::debug!(ops = proposal.len(), notes = notes.len(), "patch cycle applied");
        Ok(CycleOutcome {
            document: patched,
            notes,
            before,
            after,
        })
    }

    /// Run a cycle under the policy stored in the document itself
    ///
    /// # Errors
    /// Same as [`run`](Self::run)
    pub fn run_governed<M>(
        &self,
        document: &StateDocument,
        proposal: &PatchProposal,
        meter: &M,
    ) -> Result<CycleOutcome, PatchError>
    where
        M: MetricSource + ?Sized,
    {
        let policy = Policy::from_document(document);
        self.run(document, proposal, &policy, meter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::Evidence;
    use crate::patch::PatchOperation;
    use serde_json::{json, Value};

    #[allow(clippy::cast_precision_loss)]
    fn counter(document: &StateDocument) -> MetricSnapshot {
        let n = document
            .get_pointer("/state/items")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        MetricSnapshot::new().with("items", n as f64)
    }

    fn doc() -> StateDocument {
        StateDocument::new(json!({
            "kernel": {"policy": {
                "allowed_paths": ["/state/*"],
                "proof_required": [{"path": "/state/items/-"}]
            }},
            "state": {"items": ["a", "b"]}
        }))
        .unwrap()
    }

    fn grow() -> PatchProposal {
        PatchProposal::new(vec![PatchOperation::add("/state/items/-", json!("c"))])
    }

    #[test]
    fn verified_cycle_reports_snapshots() {
        let proposal = grow().with_evidence(Evidence::default().claim("items", 1.0));
        let outcome = PatchEngine::new()
            .run_governed(&doc(), &proposal, &counter)
            .unwrap();
        assert_eq!(outcome.before.get("items"), Some(2.0));
        assert_eq!(outcome.after.get("items"), Some(3.0));
        assert_eq!(outcome.notes.len(), 1);
    }

    #[test]
    fn wrong_direction_aborts() {
        let proposal = grow().with_evidence(Evidence::default().claim("items", -1.0));
        let err = PatchEngine::new()
            .run_governed(&doc(), &proposal, &counter)
            .unwrap_err();
        assert!(err.is_evidence_rejection());
    }

    #[test]
    fn guarded_path_without_evidence_aborts() {
        let err = PatchEngine::new()
            .run_governed(&doc(), &grow(), &counter)
            .unwrap_err();
        assert!(matches!(err, PatchError::EvidenceRequired { .. }));
    }

    #[test]
    fn unmeasured_metric_is_unknown() {
        let proposal = grow().with_evidence(Evidence::default().claim("items", 1.0));
        let err = PatchEngine::new()
            .run_governed(&doc(), &proposal, &NoMetrics)
            .unwrap_err();
        assert!(matches!(err, PatchError::UnknownMetric { .. }));
    }
}
