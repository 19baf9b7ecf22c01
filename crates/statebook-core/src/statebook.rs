//! The statebook facade
//!
//! # Core Concepts
//!
//! - [`Statebook`]: one document on disk with its dictionary and heuristics
//! - [`PatchReport`]: what a patch cycle did, accepted or not
//!
//! Every write is load → change → save under the document's lock. A
//! rejected patch cycle writes nothing, so the file keeps its exact bytes.
//!
//! # Example
//!
//! ```rust,ignore
//! use statebook_core::{Statebook, StatebookConfig};
//!
//! let book = Statebook::new(StatebookConfig::load("statebook.toml")?.with_env_overrides());
//! let report = book.apply_proposal(&serde_json::from_str(text)?)?;
//! if let Some(suggestion) = book.suggest()? {
//!     println!("{:?}", suggestion.guess);
//! }
//! ```

use crate::config::StatebookConfig;
use crate::error::StatebookResult;
use crate::locks::DocumentLocks;
use crate::meter::CandidateCountMeter;
use serde::Serialize;
use serde_json::Value;
use statebook_document::{DocumentHash, StateDocument, StateStore};
use statebook_guard::{
    CycleOutcome, MetricSnapshot, MetricSource, PatchApplier, PatchEngine, PatchOperation, PatchProposal,
    Policy, RejectionKind,
};
use statebook_solver::{
    bootstrap_entries, is_solver_project, ConstraintMutation, DictionaryCache, FeedbackParser,
    Ruleset, SolverSession, Suggestion,
};

/// Outcome of one patch cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchReport {
    /// Whether the patch is now part of the document
    pub applied: bool,
    /// Why the patch was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionKind>,
    /// Rejection message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Verification notes
    pub notes: Vec<String>,
    pub project_id: String,
    /// Metrics before the patch; empty on rejection
    pub before: MetricSnapshot,
    /// Metrics after the patch; empty on rejection
    pub after: MetricSnapshot,
    /// Hash of the document now on disk
    pub hash: DocumentHash,
}

impl PatchReport {
    #[inline]
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        !self.applied
    }
}

/// Paths the solver writes on its own behalf
fn solver_policy() -> Policy {
    Policy::deny_all()
        .allow("/project/goal")
        .allow("/project/deliverable")
        .allow("/project/success_checks")
        .allow("/state/*")
}

fn replace_ops(entries: Vec<(&'static str, Value)>) -> Vec<PatchOperation> {
    entries
        .into_iter()
        .map(|(pointer, value)| PatchOperation::replace(pointer, value))
        .collect()
}

/// A statebook on disk
#[derive(Debug)]
pub struct Statebook {
    config: StatebookConfig,
    store: StateStore,
    dictionary: DictionaryCache,
    engine: PatchEngine,
    applier: PatchApplier,
    locks: DocumentLocks,
}

impl Statebook {
    /// Open the files named in `config`; nothing is read yet
    #[must_use]
    pub fn new(config: StatebookConfig) -> Self {
        Self {
            store: StateStore::new(&config.statebook_path),
            dictionary: DictionaryCache::new(&config.dictionary_path),
            engine: PatchEngine::new(),
            applier: PatchApplier,
            locks: DocumentLocks::new(),
            config,
        }
    }

    /// Share write serialization with other statebooks
    #[inline]
    #[must_use]
    pub fn with_locks(mut self, locks: DocumentLocks) -> Self {
        self.locks = locks;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &StatebookConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn dictionary(&self) -> &DictionaryCache {
        &self.dictionary
    }

    #[inline]
    #[must_use]
    pub fn locks(&self) -> &DocumentLocks {
        &self.locks
    }

    /// Current document, the skeleton when the file is absent
    ///
    /// # Errors
    /// Returns error when the file exists but cannot be read
    pub fn load_document(&self) -> StatebookResult<StateDocument> {
        Ok(self.store.load()?)
    }

    /// Heuristics file, defaults when absent or malformed
    #[must_use]
    pub fn ruleset(&self) -> Ruleset {
        Ruleset::load(&self.config.ruleset_path)
    }

    /// Candidate-count meter over the current dictionary
    #[must_use]
    pub fn meter(&self) -> CandidateCountMeter {
        CandidateCountMeter::new(self.dictionary.snapshot())
    }

    /// Run a patch cycle under the document's own policy
    ///
    /// # Errors
    /// Only storage failures; rejections are reported in the [`PatchReport`]
    pub fn apply_proposal(&self, proposal: &PatchProposal) -> StatebookResult<PatchReport> {
        let meter = self.meter();
        self.apply_proposal_with(proposal, &meter)
    }

    /// Run a patch cycle measuring with `meter`
    ///
    /// # Errors
    /// Only storage failures; rejections are reported in the [`PatchReport`]
    pub fn apply_proposal_with<M>(&self, proposal: &PatchProposal, meter: &M) -> StatebookResult<PatchReport>
    where
        M: MetricSource + ?Sized,
    {
        self.locks.with_lock(&self.store.key(), || -> StatebookResult<PatchReport> {
            let document = self.store.load()?;
            let project_id = document.project_id().to_string();

            let outcome = match self.engine.run_governed(&document, proposal, meter) {
                Ok(outcome) => outcome,
                Err(e) => {
                    // nothing changed, so the file is left exactly as it was
                    return Ok(PatchReport {
                        applied: false,
                        rejection: Some(e.kind()),
                        error: Some(e.to_string()),
                        notes: Vec::new(),
                        project_id,
                        before: MetricSnapshot::new(),
                        after: MetricSnapshot::new(),
                        hash: document.hash(),
                    });
                }
            };

            let CycleOutcome {
                document: mut saved,
                notes,
                before,
                after,
            } = outcome;
            self.store.save(&mut saved)?;
            let hash = saved.hash();
            tracing::info!(project = %project_id, ops = proposal.len(), hash = %hash.short(), "patch applied");

            let report = PatchReport {
                applied: true,
                rejection: None,
                error: None,
                notes,
                project_id,
                before,
                after,
                hash,
            };
            Ok(report)
        })
    }

    /// Fill in missing solver defaults
    ///
    /// Returns whether anything was written. Documents of other projects are
    /// left alone.
    ///
    /// # Errors
    /// Storage failures, or a solver write refused by its own policy
    pub fn bootstrap_solver(&self) -> StatebookResult<bool> {
        self.locks.with_lock(&self.store.key(), || -> StatebookResult<bool> {
            let document = self.store.load()?;
            self.bootstrap_locked(document).map(|(_, written)| written)
        })
    }

    fn bootstrap_locked(&self, document: StateDocument) -> StatebookResult<(StateDocument, bool)> {
        let (mut document, bootstrapped) = self.bootstrapped(document)?;
        if bootstrapped {
            self.store.save(&mut document)?;
        }
        Ok((document, bootstrapped))
    }

    /// Document with solver defaults filled in, not yet saved
    fn bootstrapped(&self, document: StateDocument) -> StatebookResult<(StateDocument, bool)> {
        let entries = bootstrap_entries(&document);
        if entries.is_empty() {
            return Ok((document, false));
        }
        tracing::debug!(fields = entries.len(), "bootstrapping solver state");
        let patched = self
            .applier
            .apply(&document, &replace_ops(entries), &solver_policy(), None)?;
        Ok((patched, true))
    }

    /// Best next guess, `None` for documents of other projects
    ///
    /// # Errors
    /// Storage failures while bootstrapping, or a dictionary file that exists
    /// but cannot be read
    pub fn suggest(&self) -> StatebookResult<Option<Suggestion>> {
        let document = self.locks.with_lock(&self.store.key(), || -> StatebookResult<StateDocument> {
            let document = self.store.load()?;
            self.bootstrap_locked(document).map(|(document, _)| document)
        })?;
        if !is_solver_project(&document) {
            return Ok(None);
        }

        self.dictionary.refresh_if_stale()?;
        let session = SolverSession::from_document(&document);
        let suggestion = session.suggest(&self.dictionary.current(), &self.ruleset());
        tracing::info!(
            guess = suggestion.guess.as_deref().unwrap_or(""),
            candidates = suggestion.candidates,
            "suggestion ready"
        );
        Ok(Some(suggestion))
    }

    /// Apply structured feedback and persist the session
    ///
    /// Returns whether the stored session changed; unchanged sessions are not
    /// rewritten. Documents of other projects are left alone.
    ///
    /// # Errors
    /// Storage failures, or a solver write refused by its own policy
    pub fn apply_feedback(&self, mutations: &[ConstraintMutation]) -> StatebookResult<bool> {
        self.update_session(|_| mutations.to_vec())
    }

    /// Parse free-text feedback against the stored session, then apply it
    ///
    /// # Errors
    /// Same as [`apply_feedback`](Self::apply_feedback)
    pub fn apply_feedback_text(&self, text: &str, parser: &dyn FeedbackParser) -> StatebookResult<bool> {
        self.update_session(|session| parser.parse(text, session))
    }

    fn update_session<F>(&self, mutations_for: F) -> StatebookResult<bool>
    where
        F: FnOnce(&SolverSession) -> Vec<ConstraintMutation>,
    {
        self.locks.with_lock(&self.store.key(), || -> StatebookResult<bool> {
            let document = self.store.load()?;
            if !is_solver_project(&document) {
                tracing::debug!(project = %document.project_id(), "feedback ignored outside the solver project");
                return Ok(false);
            }
            let mut session = SolverSession::from_document(&document);
            let mutations = mutations_for(&session);
            if !session.apply_all(&mutations) {
                tracing::debug!(mutations = mutations.len(), "feedback changed nothing");
                return Ok(false);
            }

            // defaults and session land in one write
            let (document, _) = self.bootstrapped(document)?;
            let mut patched = self.applier.apply(
                &document,
                &replace_ops(session.state_entries()),
                &solver_policy(),
                None,
            )?;
            self.store.save(&mut patched)?;
            tracing::info!(
                mutations = mutations.len(),
                pattern = %session.constraints().pattern(),
                "feedback applied"
            );
            Ok(true)
        })
    }
}
