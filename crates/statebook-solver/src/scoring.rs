//! Letter statistics over a candidate set
//!
//! Both the information-gain score and the frequency heuristics read the
//! same per-position and per-letter counts, so [`CandidateStats`] computes
//! them once per candidate set.

use crate::constraints::WORD_LEN;
use std::collections::{BTreeSet, HashMap};

/// Letter counts over a candidate set
#[derive(Debug, Clone, Default)]
pub struct CandidateStats {
    positions: [HashMap<char, usize>; WORD_LEN],
    totals: HashMap<char, usize>,
    letters: usize,
    words: usize,
}

impl CandidateStats {
    /// Count letters of every candidate
    #[must_use]
    pub fn new<S: AsRef<str>>(candidates: &[S]) -> Self {
        let mut stats = Self {
            words: candidates.len(),
            ..Self::default()
        };
        for word in candidates {
            for (i, c) in word.as_ref().chars().enumerate() {
                if let Some(slot) = stats.positions.get_mut(i) {
                    *slot.entry(c).or_default() += 1;
                }
                *stats.totals.entry(c).or_default() += 1;
                stats.letters += 1;
            }
        }
        stats
    }

    /// Number of candidates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.words
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Expected narrowing from guessing `word`
    ///
    /// Sum over positions of the share of candidates with the same letter
    /// there, plus, once per distinct letter, that letter's share of all
    /// letter slots. Zero for an empty set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn information_gain(&self, word: &str) -> f64 {
        if self.words == 0 {
            return 0.0;
        }
        let n = self.words as f64;
        let slots = (WORD_LEN * self.words) as f64;

        let mut seen = BTreeSet::new();
        let mut score = 0.0;
        for (i, c) in word.chars().enumerate().take(WORD_LEN) {
            score += self.positions[i].get(&c).copied().unwrap_or(0) as f64 / n;
            if seen.insert(c) {
                score += self.totals.get(&c).copied().unwrap_or(0) as f64 / slots;
            }
        }
        score
    }

    /// Share of all letter occurrences that are `letter`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn letter_frequency(&self, letter: char) -> f64 {
        if self.letters == 0 {
            return 0.0;
        }
        self.totals.get(&letter).copied().unwrap_or(0) as f64 / self.letters as f64
    }
}

/// Information-gain score of `word` against `candidates`
#[must_use]
pub fn score_information_gain<S: AsRef<str>>(word: &str, candidates: &[S]) -> f64 {
    CandidateStats::new(candidates).information_gain(word)
}
