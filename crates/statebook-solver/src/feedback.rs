//! Structured feedback
//!
//! Free-text feedback is turned into [`ConstraintMutation`]s by a
//! [`FeedbackParser`] supplied from outside; the solver only applies them.

use crate::session::SolverSession;
use serde::{Deserialize, Serialize};

/// One change to a solving session
///
/// Positions are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintMutation {
    /// Start over
    Reset,
    /// A guess was played
    Guess { word: String },
    /// Letter confirmed at position
    Green { position: usize, letter: char },
    /// Letter present but not at position
    BanAt { position: usize, letter: char },
    /// Letter present somewhere
    Require { letter: char },
    /// Letter absent
    Exclude { letter: char },
    /// At least `count` occurrences
    MinCount { letter: char, count: usize },
    /// At most `count` occurrences
    MaxCount { letter: char, count: usize },
}

/// Turns feedback text into mutations
///
/// The session is read-only context, e.g. for resolving "the second e" against
/// the last guess.
pub trait FeedbackParser {
    fn parse(&self, text: &str, session: &SolverSession) -> Vec<ConstraintMutation>;
}

impl<F> FeedbackParser for F
where
    F: Fn(&str, &SolverSession) -> Vec<ConstraintMutation>,
{
    fn parse(&self, text: &str, session: &SolverSession) -> Vec<ConstraintMutation> {
        self(text, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mutations_use_kind_tag() {
        let m = ConstraintMutation::Green {
            position: 1,
            letter: 'r',
        };
        assert_eq!(
            serde_json::to_value(&m).unwrap(),
            json!({"kind": "green", "position": 1, "letter": "r"})
        );
        let back: ConstraintMutation =
            serde_json::from_value(json!({"kind": "min_count", "letter": "e", "count": 2})).unwrap();
        assert_eq!(
            back,
            ConstraintMutation::MinCount {
                letter: 'e',
                count: 2
            }
        );
    }

    #[test]
    fn closures_are_parsers() {
        let parser = |text: &str, _: &SolverSession| {
            text.chars()
                .map(|letter| ConstraintMutation::Exclude { letter })
                .collect::<Vec<_>>()
        };
        let session = SolverSession::new();
        assert_eq!(parser.parse("ab", &session).len(), 2);
    }
}
