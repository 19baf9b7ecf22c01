//! Candidate-count metric
//!
//! The only metric the statebook measures itself: how many dictionary words
//! the stored constraints still admit. Documents of other projects measure
//! nothing, so evidence claimed against them is rejected as unknown.

use statebook_document::StateDocument;
use statebook_guard::{MetricSnapshot, MetricSource};
use statebook_solver::{is_solver_project, Constraints, Dictionary};

/// Metric name reported by [`CandidateCountMeter`]
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Counts candidates under the document's constraints
///
/// Holds one dictionary snapshot so before and after are measured against
/// the same word list.
#[derive(Debug, Clone)]
pub struct CandidateCountMeter {
    dictionary: Dictionary,
}

impl CandidateCountMeter {
    #[inline]
    #[must_use]
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }

    #[inline]
    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}

impl MetricSource for CandidateCountMeter {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, document: &StateDocument) -> MetricSnapshot {
        if !is_solver_project(document) {
            return MetricSnapshot::new();
        }
        let count = Constraints::from_document(document)
            .filter_candidates(&self.dictionary)
            .len();
        MetricSnapshot::new().with(CANDIDATE_COUNT, count as f64)
    }
}
