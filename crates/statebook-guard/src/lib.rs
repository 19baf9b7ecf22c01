//! Statebook Guard
//!
//! Policy-gated mutation of state documents, with evidence checked against
//! measurement.
//!
//! # Core Concepts
//!
//! - [`Policy`]: which paths a patch may touch, which need evidence
//! - [`PatchApplier`]: copy-on-write application of `add`/`replace` ops
//! - [`EvidenceVerifier`]: directional agreement of claimed vs. observed deltas
//! - [`PatchEngine`]: measure → apply → measure → verify, all or nothing
//!
//! # Example
//!
//! ```rust,ignore
//! use statebook_guard::{PatchEngine, PatchProposal, NoMetrics};
//!
//! let proposal: PatchProposal = serde_json::from_str(text)?;
//! let outcome = PatchEngine::new().run_governed(&document, &proposal, &NoMetrics)?;
//! document = outcome.document;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod applier;
mod engine;
mod error;
mod evidence;
mod patch;
mod policy;

pub use applier::PatchApplier;
pub use engine::{CycleOutcome, MetricSource, NoMetrics, PatchEngine};
pub use error::{PatchError, RejectionKind};
pub use evidence::{Evidence, EvidenceVerifier, MetricSnapshot};
pub use patch::{PatchOpKind, PatchOperation, PatchProposal};
pub use policy::{PathPattern, Policy, ProofRequirement, POLICY_POINTER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
