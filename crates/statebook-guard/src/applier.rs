//! Policy-checked patch application
//!
//! [`PatchApplier::apply`] never touches its input. It works on a private
//! copy and hands that copy back only when every operation succeeded, so a
//! rejection at operation `n` leaves no trace of operations `0..n`.

use crate::error::PatchError;
use crate::evidence::Evidence;
use crate::patch::{PatchOpKind, PatchOperation};
use crate::policy::Policy;
use statebook_document::{PointerError, StateDocument};

/// Applies operations under a policy
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchApplier;

impl PatchApplier {
    /// Apply `ops` in order and return the patched copy
    ///
    /// `evidence` belongs to the whole patch; any operation on a
    /// proof-required path is rejected when it is absent or empty. Policy
    /// checks see the normalized pointer, so `/state//x` is judged as
    /// `/state/x` and `/state/` as `/state`.
    ///
    /// # Errors
    /// - [`PatchError::PolicyViolation`] for a path outside `allowed_paths`
    /// - [`PatchError::EvidenceRequired`] for a guarded path without evidence
    /// - [`PatchError::UnsupportedOperation`] for kinds other than add/replace
    /// - [`PatchError::InvalidTarget`] when the path cannot be resolved
    pub fn apply(
        &self,
        document: &StateDocument,
        ops: &[PatchOperation],
        policy: &Policy,
        evidence: Option<&Evidence>,
    ) -> Result<StateDocument, PatchError> {
        let has_evidence = evidence.is_some_and(|e| !e.is_empty());
        let mut working = document.clone();

        for (index, op) in ops.iter().enumerate() {
            // checked in the same normalized form the write resolves to
            let target = op.pointer().to_string();
            if !policy.allows(&target) {
                tracing::debug!(index, path = %op.path, "rejected: path not allowed");
                return Err(PatchError::policy_violation(&op.path));
            }
            if policy.requires_proof(&target) && !has_evidence {
                tracing::debug!(index, path = %op.path, "rejected: evidence required");
                return Err(PatchError::evidence_required(&op.path));
            }
            Self::apply_one(&mut working, op)?;
        }

        Ok(working)
    }

    fn apply_one(document: &mut StateDocument, op: &PatchOperation) -> Result<(), PatchError> {
        let pointer = op.pointer();
        let invalid = |source: PointerError| PatchError::InvalidTarget {
            path: op.path.clone(),
            source,
        };

        match &op.op {
            PatchOpKind::Replace => document
                .set_value(&pointer, op.value.clone())
                .map_err(invalid),
            PatchOpKind::Add if pointer.targets_sequence_slot() => document
                .insert_into_sequence(&pointer, op.value.clone())
                .map_err(invalid),
            PatchOpKind::Add => document
                .set_value(&pointer, op.value.clone())
                .map_err(invalid),
            PatchOpKind::Other(name) => Err(PatchError::unsupported(name, &op.path)),
        }
    }
}
