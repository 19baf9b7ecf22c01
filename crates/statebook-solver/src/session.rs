//! A solving session and its suggestions
//!
//! # Core Concepts
//!
//! - [`SolverSession`]: constraints plus the ordered guess history
//! - [`Suggestion`]: best candidate (or none) with the numbers behind it
//!
//! Ranking blends information gain with the ruleset's heuristics. Among
//! equal top scores the lexicographically smallest word wins.

use crate::constraints::Constraints;
use crate::dictionary::Dictionary;
use crate::feedback::ConstraintMutation;
use crate::heuristics::{Ruleset, Weights};
use crate::scoring::CandidateStats;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use statebook_document::StateDocument;
use std::cmp::Ordering;

/// Where the guess history lives inside a state document
pub const HISTORY_POINTER: &str = "/state/history";

/// Where the most recent guess lives inside a state document
pub const LAST_GUESS_POINTER: &str = "/state/_last_guess";

/// One played guess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub guess: String,
    /// Other fields recorded with the guess
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GuessRecord {
    #[must_use]
    pub fn new(guess: impl Into<String>) -> Self {
        Self {
            guess: guess.into(),
            extra: Map::new(),
        }
    }
}

/// One stored history entry
///
/// Entries this version does not understand are kept verbatim so they
/// survive a rewrite and still count as played turns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HistoryEntry {
    /// `{"guess": ..}` record
    Guess(GuessRecord),
    /// Anything else, including bare guess strings
    Other(Value),
}

impl HistoryEntry {
    fn from_value(value: &Value) -> Self {
        let is_record = value.get("guess").is_some_and(Value::is_string);
        if is_record {
            if let Ok(record) = serde_json::from_value(value.clone()) {
                return Self::Guess(record);
            }
        }
        Self::Other(value.clone())
    }

    /// Guessed word, if the entry names one
    #[must_use]
    pub fn guess(&self) -> Option<&str> {
        match self {
            Self::Guess(record) => Some(&record.guess),
            Self::Other(Value::String(word)) => Some(word),
            Self::Other(_) => None,
        }
    }
}

impl From<GuessRecord> for HistoryEntry {
    fn from(record: GuessRecord) -> Self {
        Self::Guess(record)
    }
}

/// Constraints and guess history of one solve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverSession {
    constraints: Constraints,
    history: Vec<HistoryEntry>,
    last_guess: String,
}

impl SolverSession {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with the given constraints and no history
    #[must_use]
    pub fn with_constraints(constraints: Constraints) -> Self {
        Self {
            constraints,
            ..Self::default()
        }
    }

    /// Session stored in a document; missing or malformed parts default
    #[must_use]
    pub fn from_document(document: &StateDocument) -> Self {
        let history = document
            .get_pointer(HISTORY_POINTER)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(HistoryEntry::from_value).collect())
            .unwrap_or_default();
        let last_guess = document
            .get_pointer(LAST_GUESS_POINTER)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            constraints: Constraints::from_document(document),
            history,
            last_guess,
        }
    }

    /// Pointer/value pairs that persist this session
    #[must_use]
    pub fn state_entries(&self) -> Vec<(&'static str, Value)> {
        vec![
            (crate::constraints::CONSTRAINTS_POINTER, self.constraints.to_value()),
            (HISTORY_POINTER, json!(self.history)),
            (LAST_GUESS_POINTER, Value::String(self.last_guess.clone())),
        ]
    }

    #[inline]
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    #[inline]
    pub fn constraints_mut(&mut self) -> &mut Constraints {
        &mut self.constraints
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Most recent guess, empty before the first one
    #[inline]
    #[must_use]
    pub fn last_guess(&self) -> &str {
        &self.last_guess
    }

    /// 1-based index of the upcoming turn
    #[inline]
    #[must_use]
    pub fn turn_index(&self) -> usize {
        self.history.len() + 1
    }

    /// Clear constraints and history
    pub fn reset(&mut self) -> bool {
        let changed = !self.history.is_empty() || !self.last_guess.is_empty();
        self.history.clear();
        self.last_guess.clear();
        self.constraints.reset() | changed
    }

    /// Append a played guess unless it repeats the previous one
    pub fn record_guess(&mut self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        if word.is_empty() || word == self.last_guess {
            return false;
        }
        self.history.push(GuessRecord::new(word.as_str()).into());
        self.last_guess = word;
        true
    }

    /// Apply one mutation, reporting whether anything changed
    pub fn apply(&mut self, mutation: &ConstraintMutation) -> bool {
        use ConstraintMutation as M;
        match *mutation {
            M::Reset => self.reset(),
            M::Guess { ref word } => self.record_guess(word),
            M::Green { position, letter } => self.constraints.set_green(position, letter),
            M::BanAt { position, letter } => self.constraints.ban_at(position, letter),
            M::Require { letter } => self.constraints.require(letter),
            M::Exclude { letter } => self.constraints.exclude(letter),
            M::MinCount { letter, count } => self.constraints.set_min_count(letter, count),
            M::MaxCount { letter, count } => self.constraints.set_max_count(letter, count),
        }
    }

    /// Apply mutations in order
    pub fn apply_all<'a, I>(&mut self, mutations: I) -> bool
    where
        I: IntoIterator<Item = &'a ConstraintMutation>,
    {
        mutations
            .into_iter()
            .fold(false, |changed, m| self.apply(m) | changed)
    }

    /// Dictionary words admitted by the constraints
    #[must_use]
    pub fn candidates<'d>(&self, dictionary: &'d Dictionary) -> Vec<&'d str> {
        self.constraints.filter_candidates(dictionary)
    }

    /// Weighted sum of information gain and heuristics for `word`
    #[must_use]
    pub fn blended_score(&self, word: &str, stats: &CandidateStats, ruleset: &Ruleset) -> f64 {
        let info = stats.information_gain(word);
        let heuristic = ruleset.score_heuristic(word, stats, self.turn_index());
        ruleset.weights.blend(info, heuristic)
    }

    /// Best candidate under the constraints
    ///
    /// An empty candidate set yields a suggestion without a guess.
    #[must_use]
    pub fn suggest(&self, dictionary: &Dictionary, ruleset: &Ruleset) -> Suggestion {
        let candidates = self.candidates(dictionary);
        let mut suggestion = Suggestion {
            guess: None,
            score: None,
            candidates: candidates.len(),
            dictionary: dictionary.len(),
            weights: ruleset.weights,
        };
        if candidates.is_empty() {
            tracing::debug!(dictionary = dictionary.len(), "no candidate satisfies the constraints");
            return suggestion;
        }

        let stats = CandidateStats::new(&candidates);
        let mut best: Option<(f64, &str)> = None;
        for &word in &candidates {
            let score = self.blended_score(word, &stats, ruleset);
            let better = match best {
                None => true,
                Some((top, top_word)) => match score.total_cmp(&top) {
                    Ordering::Greater => true,
                    Ordering::Equal => word < top_word,
                    Ordering::Less => false,
                },
            };
            if better {
                best = Some((score, word));
            }
        }

        if let Some((score, word)) = best {
            tracing::debug!(guess = word, score, candidates = candidates.len(), "suggestion ranked");
            suggestion.guess = Some(word.to_string());
            suggestion.score = Some(score);
        }
        suggestion
    }
}

/// Outcome of ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Best word, `None` when no candidate remains
    pub guess: Option<String>,
    /// Blended score of `guess`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Candidates left after filtering
    pub candidates: usize,
    /// Dictionary size
    #[serde(rename = "dict")]
    pub dictionary: usize,
    /// Blend weights used
    pub weights: Weights,
}

impl Suggestion {
    /// Whether a guess was found
    #[inline]
    #[must_use]
    pub fn is_solution(&self) -> bool {
        self.guess.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dict(words: &[&str]) -> Dictionary {
        Dictionary::from_words(words)
    }

    #[test]
    fn record_guess_skips_repeats() {
        let mut s = SolverSession::new();
        assert_eq!(s.turn_index(), 1);
        assert!(s.record_guess("CRANE"));
        assert!(!s.record_guess("crane"));
        assert!(s.record_guess("slate"));
        assert_eq!(s.turn_index(), 3);
        assert_eq!(s.last_guess(), "slate");
    }

    #[test]
    fn reset_clears_history_too() {
        let mut s = SolverSession::new();
        s.record_guess("crane");
        s.constraints_mut().exclude('z');
        assert!(s.reset());
        assert!(!s.reset());
        assert_eq!(s, SolverSession::new());
    }

    #[test]
    fn suggest_on_empty_set_has_no_guess() {
        let mut s = SolverSession::new();
        s.constraints_mut().set_green(0, 'q');
        let out = s.suggest(&dict(&["crane", "slate"]), &Ruleset::default());
        assert_eq!(out.guess, None);
        assert_eq!(out.candidates, 0);
        assert_eq!(out.dictionary, 2);
        assert!(!out.is_solution());
    }

    #[test]
    fn ties_break_lexicographically() {
        // mirrored words have identical letter statistics
        let d = dict(&["abcde", "edcba"]);
        let s = SolverSession::new();
        let out = s.suggest(&d, &Ruleset::default());
        assert_eq!(out.guess.as_deref(), Some("abcde"));

        let d = dict(&["edcba", "abcde"]);
        let out = s.suggest(&d, &Ruleset::default());
        assert_eq!(out.guess.as_deref(), Some("abcde"));
    }

    #[test]
    fn suggests_highest_blended_score() {
        let d = dict(&["crisp", "crust", "crane", "zzzzz"]);
        let out = SolverSession::new().suggest(&d, &Ruleset::default());
        assert_eq!(out.candidates, 4);
        assert_ne!(out.guess.as_deref(), Some("zzzzz"));
        assert!(out.score.is_some());
    }

    #[test]
    fn apply_mutations_reports_any_change() {
        let mut s = SolverSession::new();
        let ms = vec![
            ConstraintMutation::Guess {
                word: "crane".into(),
            },
            ConstraintMutation::Green {
                position: 0,
                letter: 'c',
            },
            ConstraintMutation::Exclude { letter: 'a' },
        ];
        assert!(s.apply_all(&ms));
        assert!(!s.apply_all(&ms[1..]));
        assert_eq!(s.constraints().pattern(), "c____");
        assert!(s.apply(&ConstraintMutation::Reset));
        assert!(s.constraints().is_empty());
    }

    #[test]
    fn document_roundtrip() {
        let mut s = SolverSession::new();
        s.record_guess("crane");
        s.constraints_mut().set_green(1, 'r');

        let mut doc = StateDocument::skeleton();
        for (pointer, value) in s.state_entries() {
            doc.set_value(&pointer.into(), value).unwrap();
        }
        assert_eq!(SolverSession::from_document(&doc), s);
        assert_eq!(
            doc.get_pointer(HISTORY_POINTER),
            Some(&json!([{"guess": "crane"}]))
        );
    }

    #[test]
    fn history_keeps_unrecognized_entries() {
        let doc = StateDocument::new(json!({
            "state": {"history": ["crane", {"guess": "slate", "turn": 2}, 4]}
        }))
        .unwrap();
        let mut s = SolverSession::from_document(&doc);
        assert_eq!(s.history().len(), 3);
        assert_eq!(s.turn_index(), 4);
        assert_eq!(s.history()[0].guess(), Some("crane"));
        assert_eq!(s.history()[2].guess(), None);
        match &s.history()[1] {
            HistoryEntry::Guess(record) => assert_eq!(record.extra.get("turn"), Some(&json!(2))),
            other => panic!("expected a record, got {other:?}"),
        }

        assert!(s.record_guess("pique"));
        let (_, stored) = s
            .state_entries()
            .into_iter()
            .find(|(pointer, _)| *pointer == HISTORY_POINTER)
            .unwrap();
        assert_eq!(
            stored,
            json!(["crane", {"guess": "slate", "turn": 2}, 4, {"guess": "pique"}])
        );
    }
}
