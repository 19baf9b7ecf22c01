//! Learned heuristics and blend weights
//!
//! A [`Ruleset`] is data: blend weights plus a list of weighted rules. Each
//! rule gates its weight on conditions (turn window, distinct letters,
//! vowel count) and may scale it by the candidates' letter frequencies.
//!
//! Three rule ids carry built-in conditions:
//!
//! | id                        | gate                              | scale            |
//! |---------------------------|-----------------------------------|------------------|
//! | `avoid_duplicates_early`  | turn ≤ 2, all letters distinct    | none             |
//! | `prefer_common_letters`   | none                              | letter frequency |
//! | `prefer_two_vowels_early` | turn ≤ 2, ≥ 2 distinct vowels     | none             |
//!
//! Any rule may spell out `conditions`/`scale` itself. A rule with an
//! unknown id and no explicit data scores zero.

use crate::scoring::CandidateStats;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Weight given as a number or a numeric string
fn numeric<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("weight out of range: {n}"))),
        Value::String(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid weight: {text:?}"))),
        other => Err(D::Error::custom(format!("invalid weight: {other}"))),
    }
}

/// Blend weights for the two score components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    #[serde(alias = "infoGain", deserialize_with = "numeric")]
    pub info_gain: f64,
    #[serde(deserialize_with = "numeric")]
    pub heuristics: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            info_gain: 0.8,
            heuristics: 0.2,
        }
    }
}

impl Weights {
    /// `info_gain · info + heuristics · heur`
    #[inline]
    #[must_use]
    pub fn blend(&self, info: f64, heuristic: f64) -> f64 {
        self.info_gain * info + self.heuristics * heuristic
    }
}

/// When a rule applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConditions {
    /// Last turn (1-based) on which the rule applies
    #[serde(alias = "maxTurn", skip_serializing_if = "Option::is_none")]
    pub max_turn: Option<usize>,
    /// Only words without repeated letters
    #[serde(alias = "distinctLetters")]
    pub distinct_letters: bool,
    /// Minimum number of distinct vowels
    #[serde(alias = "minVowels", skip_serializing_if = "Option::is_none")]
    pub min_vowels: Option<usize>,
}

impl RuleConditions {
    fn hold(&self, word: &str, turn: usize) -> bool {
        if self.max_turn.is_some_and(|max| turn > max) {
            return false;
        }
        let distinct: BTreeSet<char> = word.chars().collect();
        if self.distinct_letters && distinct.len() != word.chars().count() {
            return false;
        }
        if let Some(min) = self.min_vowels {
            if distinct.iter().filter(|c| VOWELS.contains(c)).count() < min {
                return false;
            }
        }
        true
    }
}

/// How a rule's weight is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScale {
    /// Summed frequency of the word's distinct letters among candidates
    LetterFrequency,
    /// Unrecognized scale; the rule scores zero
    #[serde(other)]
    Unknown,
}

/// One weighted rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default, deserialize_with = "numeric")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RuleConditions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<RuleScale>,
}

impl Rule {
    #[must_use]
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            conditions: None,
            scale: None,
        }
    }

    /// Explicit conditions
    #[must_use]
    pub fn with_conditions(mut self, conditions: RuleConditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Explicit scale
    #[must_use]
    pub fn with_scale(mut self, scale: RuleScale) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Effective gate and scale, `None` when the rule means nothing
    fn resolve(&self) -> Option<(RuleConditions, Option<RuleScale>)> {
        let preset = builtin(&self.id);
        if self.conditions.is_none() && self.scale.is_none() {
            return preset;
        }
        let (preset_conditions, preset_scale) = preset.unwrap_or_default();
        Some((
            self.conditions.unwrap_or(preset_conditions),
            self.scale.or(preset_scale),
        ))
    }

    /// Contribution of this rule to `word`'s heuristic score
    #[must_use]
    pub fn score(&self, word: &str, stats: &CandidateStats, turn: usize) -> f64 {
        let Some((conditions, scale)) = self.resolve() else {
            return 0.0;
        };
        if !conditions.hold(word, turn) {
            return 0.0;
        }
        match scale {
            None => self.weight,
            Some(RuleScale::LetterFrequency) => {
                let distinct: BTreeSet<char> = word.chars().collect();
                let mass: f64 = distinct.iter().map(|&c| stats.letter_frequency(c)).sum();
                mass * self.weight
            }
            Some(RuleScale::Unknown) => 0.0,
        }
    }
}

fn builtin(id: &str) -> Option<(RuleConditions, Option<RuleScale>)> {
    let early = Some(2);
    match id.to_ascii_lowercase().as_str() {
        "avoid_duplicates_early" => Some((
            RuleConditions {
                max_turn: early,
                distinct_letters: true,
                min_vowels: None,
            },
            None,
        )),
        "prefer_common_letters" => Some((RuleConditions::default(), Some(RuleScale::LetterFrequency))),
        "prefer_two_vowels_early" => Some((
            RuleConditions {
                max_turn: early,
                distinct_letters: false,
                min_vowels: Some(2),
            },
            None,
        )),
        _ => None,
    }
}

/// Blend weights plus heuristic rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Ruleset {
    /// Parse a ruleset document
    ///
    /// # Errors
    /// Returns error on malformed JSON or ill-typed fields
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Load from `path`, defaulting when missing or unreadable
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no ruleset, using default weights");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read ruleset, using defaults");
                return Self::default();
            }
        };
        Self::from_json_str(&text).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "malformed ruleset, using defaults");
            Self::default()
        })
    }

    /// Add a rule
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Override blend weights
    #[must_use]
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Sum of every rule's contribution
    #[must_use]
    pub fn score_heuristic(&self, word: &str, stats: &CandidateStats, turn: usize) -> f64 {
        self.rules.iter().map(|r| r.score(word, stats, turn)).sum()
    }
}
