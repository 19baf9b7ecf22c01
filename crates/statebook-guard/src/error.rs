//! Error types for the guard
//!
//! Every variant aborts the whole patch cycle. The caller keeps the document
//! it had before the attempt.

use serde::{Deserialize, Serialize};
use statebook_document::PointerError;
use std::fmt;

/// Why a patch cycle was rejected
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// Path not covered by the policy's allowed patterns
    #[error("path not allowed: {path}")]
    PolicyViolation { path: String },

    /// Proof-required path touched without evidence
    #[error("evidence required for risky edit at {path}")]
    EvidenceRequired { path: String },

    /// Operation kind other than add/replace
    #[error("unsupported op '{op}' at {path}")]
    UnsupportedOperation { op: String, path: String },

    /// Claimed metric missing from a snapshot
    #[error("unknown metric in evidence: {metric}")]
    UnknownMetric { metric: String },

    /// Claimed direction contradicts the observed change
    #[error("evidence mismatch for {metric}: claimed {claimed}, observed {observed}")]
    EvidenceMismatch {
        metric: String,
        claimed: f64,
        observed: f64,
    },

    /// Path is allowed but cannot be resolved in the document
    #[error("invalid target {path}: {source}")]
    InvalidTarget {
        path: String,
        #[source]
        source: PointerError,
    },
}

impl PatchError {
    /// Create policy violation for path
    pub fn policy_violation(path: impl Into<String>) -> Self {
        Self::PolicyViolation { path: path.into() }
    }

    /// Create evidence-required error for path
    pub fn evidence_required(path: impl Into<String>) -> Self {
        Self::EvidenceRequired { path: path.into() }
    }

    /// Create unsupported-operation error
    pub fn unsupported(op: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            op: op.into(),
            path: path.into(),
        }
    }

    /// Failure kind as data
    #[must_use]
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::PolicyViolation { .. } => RejectionKind::PolicyViolation,
            Self::EvidenceRequired { .. } => RejectionKind::EvidenceRequired,
            Self::UnsupportedOperation { .. } => RejectionKind::UnsupportedOperation,
            Self::UnknownMetric { .. } => RejectionKind::UnknownMetric,
            Self::EvidenceMismatch { .. } => RejectionKind::EvidenceMismatch,
            Self::InvalidTarget { .. } => RejectionKind::InvalidTarget,
        }
    }

    /// Rejected by the policy guard before touching the document
    #[inline]
    #[must_use]
    pub fn is_policy_rejection(&self) -> bool {
        matches!(
            self,
            Self::PolicyViolation { .. } | Self::EvidenceRequired { .. }
        )
    }

    /// Rejected by the evidence verifier after applying
    #[inline]
    #[must_use]
    pub fn is_evidence_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnknownMetric { .. } | Self::EvidenceMismatch { .. }
        )
    }
}

/// Failure kind reported at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    PolicyViolation,
    EvidenceRequired,
    UnsupportedOperation,
    UnknownMetric,
    EvidenceMismatch,
    InvalidTarget,
}

impl RejectionKind {
    /// Stable identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PolicyViolation => "policy_violation",
            Self::EvidenceRequired => "evidence_required",
            Self::UnsupportedOperation => "unsupported_operation",
            Self::UnknownMetric => "unknown_metric",
            Self::EvidenceMismatch => "evidence_mismatch",
            Self::InvalidTarget => "invalid_target",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
