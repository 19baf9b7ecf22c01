//! Accumulated guess feedback
//!
//! [`Constraints`] records what is known about the hidden word: fixed letters
//! per position, letters banned from a position, letters that must or must
//! not appear, and per-letter occurrence bounds.
//!
//! Mutations only ever add or tighten restrictions. The one exception is
//! [`Constraints::set_green`], which lifts a global exclusion of the letter
//! it fixes. [`Constraints::reset`] is the only way back to an empty state.
//!
//! Parsing is lenient: malformed fields fall back to their defaults and
//! unknown fields are kept in [`Constraints::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use statebook_document::StateDocument;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Letters per word
pub const WORD_LEN: usize = 5;

/// Where constraints live inside a state document
pub const CONSTRAINTS_POINTER: &str = "/state/constraints";

const KNOWN_FIELDS: [&str; 6] = [
    "greens",
    "yellows_not_here",
    "must_include",
    "must_exclude",
    "min_counts",
    "max_counts",
];

/// Known restrictions on the hidden word
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Constraints {
    greens: [Option<char>; WORD_LEN],
    yellows_not_here: [BTreeSet<char>; WORD_LEN],
    must_include: BTreeSet<char>,
    must_exclude: BTreeSet<char>,
    min_counts: BTreeMap<char, usize>,
    max_counts: BTreeMap<char, usize>,
    /// Unrecognized fields
    pub extra: Map<String, Value>,
}

impl Constraints {
    /// No restrictions
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a constraints value leniently
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let mut out = Self::default();

        if let Some(greens) = map.get("greens").and_then(Value::as_array) {
            for (slot, raw) in out.greens.iter_mut().zip(greens) {
                *slot = raw.as_str().and_then(|s| s.chars().next()).and_then(normalize);
            }
        }
        if let Some(rows) = map.get("yellows_not_here").and_then(Value::as_array) {
            for (slot, raw) in out.yellows_not_here.iter_mut().zip(rows) {
                *slot = letters_of(raw);
            }
        }
        out.must_include = map.get("must_include").map(letters_of).unwrap_or_default();
        out.must_exclude = map.get("must_exclude").map(letters_of).unwrap_or_default();
        out.min_counts = map.get("min_counts").map(counts_of).unwrap_or_default();
        out.max_counts = map.get("max_counts").map(counts_of).unwrap_or_default();
        out.extra = map
            .iter()
            .filter(|(k, _)| !KNOWN_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out
    }

    /// Constraints stored in a document, empty when absent
    #[must_use]
    pub fn from_document(document: &StateDocument) -> Self {
        document
            .get_pointer(CONSTRAINTS_POINTER)
            .map(Self::from_value)
            .unwrap_or_default()
    }

    /// Stored form
    #[must_use]
    pub fn to_value(&self) -> Value {
        let greens: Vec<String> = self
            .greens
            .iter()
            .map(|g| g.map(String::from).unwrap_or_default())
            .collect();
        let yellows: Vec<Vec<String>> = self
            .yellows_not_here
            .iter()
            .map(|set| set.iter().map(|c| c.to_string()).collect())
            .collect();

        let mut map = self.extra.clone();
        map.insert("greens".into(), json!(greens));
        map.insert("yellows_not_here".into(), json!(yellows));
        map.insert("must_include".into(), json!(letter_list(&self.must_include)));
        map.insert("must_exclude".into(), json!(letter_list(&self.must_exclude)));
        map.insert("min_counts".into(), json!(count_map(&self.min_counts)));
        map.insert("max_counts".into(), json!(count_map(&self.max_counts)));
        Value::Object(map)
    }

    #[inline]
    #[must_use]
    pub fn greens(&self) -> &[Option<char>; WORD_LEN] {
        &self.greens
    }

    #[inline]
    #[must_use]
    pub fn yellows_not_here(&self) -> &[BTreeSet<char>; WORD_LEN] {
        &self.yellows_not_here
    }

    #[inline]
    #[must_use]
    pub fn must_include(&self) -> &BTreeSet<char> {
        &self.must_include
    }

    #[inline]
    #[must_use]
    pub fn must_exclude(&self) -> &BTreeSet<char> {
        &self.must_exclude
    }

    #[inline]
    #[must_use]
    pub fn min_counts(&self) -> &BTreeMap<char, usize> {
        &self.min_counts
    }

    #[inline]
    #[must_use]
    pub fn max_counts(&self) -> &BTreeMap<char, usize> {
        &self.max_counts
    }

    /// Whether nothing is known yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Clear everything
    pub fn reset(&mut self) -> bool {
        let changed = !self.is_empty();
        *self = Self::default();
        changed
    }

    /// Fix `letter` at `position`, lifting any global exclusion of it
    pub fn set_green(&mut self, position: usize, letter: char) -> bool {
        let (Some(slot), Some(letter)) = (self.greens.get_mut(position), normalize(letter)) else {
            return false;
        };
        let mut changed = false;
        if *slot != Some(letter) {
            *slot = Some(letter);
            changed = true;
        }
        changed | self.must_exclude.remove(&letter)
    }

    /// Mark `letter` as present but not at `position`
    pub fn ban_at(&mut self, position: usize, letter: char) -> bool {
        match (self.yellows_not_here.get_mut(position), normalize(letter)) {
            (Some(banned), Some(letter)) => banned.insert(letter),
            _ => false,
        }
    }

    /// Require `letter` somewhere in the word
    pub fn require(&mut self, letter: char) -> bool {
        normalize(letter).is_some_and(|l| self.must_include.insert(l))
    }

    /// Exclude `letter` everywhere
    ///
    /// No effect when the letter is already fixed or required.
    pub fn exclude(&mut self, letter: char) -> bool {
        let Some(letter) = normalize(letter) else {
            return false;
        };
        if self.greens.contains(&Some(letter)) || self.must_include.contains(&letter) {
            return false;
        }
        self.must_exclude.insert(letter)
    }

    /// Raise the minimum count of `letter` to at least `n`
    pub fn set_min_count(&mut self, letter: char, n: usize) -> bool {
        let Some(letter) = normalize(letter) else {
            return false;
        };
        let current = self.min_counts.get(&letter).copied();
        let target = current.map_or(n, |c| c.max(n));
        tighten(&mut self.min_counts, letter, current, target)
    }

    /// Lower the maximum count of `letter` to at most `n`
    pub fn set_max_count(&mut self, letter: char, n: usize) -> bool {
        let Some(letter) = normalize(letter) else {
            return false;
        };
        let current = self.max_counts.get(&letter).copied();
        let target = current.map_or(n, |c| c.min(n));
        tighten(&mut self.max_counts, letter, current, target)
    }

    /// Whether `word` satisfies every restriction
    #[must_use]
    pub fn admits(&self, word: &str) -> bool {
        let letters: Vec<char> = word.chars().flat_map(char::to_lowercase).collect();
        if letters.len() != WORD_LEN {
            return false;
        }

        let greens_ok = self
            .greens
            .iter()
            .zip(&letters)
            .all(|(green, c)| green.map_or(true, |g| g == *c));
        if !greens_ok {
            return false;
        }
        if letters
            .iter()
            .zip(&self.yellows_not_here)
            .any(|(c, banned)| banned.contains(c))
        {
            return false;
        }
        if letters.iter().any(|c| self.must_exclude.contains(c)) {
            return false;
        }
        if !self.must_include.iter().all(|c| letters.contains(c)) {
            return false;
        }

        let count = |letter: char| letters.iter().filter(|&&c| c == letter).count();
        self.min_counts.iter().all(|(&l, &min)| count(l) >= min)
            && self.max_counts.iter().all(|(&l, &max)| count(l) <= max)
    }

    /// Words from `dictionary` that satisfy every restriction, in order
    #[must_use]
    pub fn filter_candidates<'a, I>(&self, dictionary: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a String>,
    {
        dictionary
            .into_iter()
            .map(String::as_str)
            .filter(|w| self.admits(w))
            .collect()
    }

    /// Green letters as a pattern such as `cr___`
    #[must_use]
    pub fn pattern(&self) -> String {
        self.greens.iter().map(|g| g.unwrap_or('_')).collect()
    }

    /// Pattern plus include/exclude lists
    #[must_use]
    pub fn compact_summary(&self) -> Value {
        json!({
            "greens": self.pattern(),
            "must_include": letter_list(&self.must_include),
            "must_exclude": letter_list(&self.must_exclude),
        })
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = |set: &BTreeSet<char>| {
            if set.is_empty() {
                "(none)".to_string()
            } else {
                set.iter().collect()
            }
        };
        let bans: Vec<String> = self
            .yellows_not_here
            .iter()
            .enumerate()
            .filter(|(_, set)| !set.is_empty())
            .map(|(i, set)| format!("{}:{}", i + 1, joined(set)))
            .collect();
        let bans = if bans.is_empty() {
            "(none)".to_string()
        } else {
            bans.join(", ")
        };

        writeln!(f, "GREENS pattern: {}", self.pattern())?;
        writeln!(f, "MUST INCLUDE: {}", joined(&self.must_include))?;
        writeln!(f, "MUST EXCLUDE: {}", joined(&self.must_exclude))?;
        write!(f, "YELLOWS not allowed positions: {bans}")
    }
}

impl From<Value> for Constraints {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl From<Constraints> for Value {
    fn from(constraints: Constraints) -> Self {
        constraints.to_value()
    }
}

fn tighten(bounds: &mut BTreeMap<char, usize>, letter: char, current: Option<usize>, target: usize) -> bool {
    if current == Some(target) {
        return false;
    }
    bounds.insert(letter, target);
    true
}

/// Lowercase alphabetic letter, `None` for anything else
fn normalize(letter: char) -> Option<char> {
    let mut lower = letter.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(c), None) if c.is_alphabetic() => Some(c),
        _ => None,
    }
}

fn letters_of(value: &Value) -> BTreeSet<char> {
    match value {
        Value::String(s) => s.chars().filter_map(normalize).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(str::chars)
            .filter_map(normalize)
            .collect(),
        _ => BTreeSet::new(),
    }
}

fn counts_of(value: &Value) -> BTreeMap<char, usize> {
    let Some(map) = value.as_object() else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(k, v)| {
            let letter = k.chars().next().and_then(normalize)?;
            let n = match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }?;
            Some((letter, usize::try_from(n).ok()?))
        })
        .collect()
}

fn letter_list(set: &BTreeSet<char>) -> Vec<String> {
    set.iter().map(|c| c.to_string()).collect()
}

fn count_map(bounds: &BTreeMap<char, usize>) -> BTreeMap<String, usize> {
    bounds.iter().map(|(c, n)| (c.to_string(), *n)).collect()
}
