//! Slash-delimited pointers into a state document
//!
//! Provides [`PointerPath`] for addressing nodes inside a
//! [`StateDocument`](crate::StateDocument).

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Final segment meaning "append to the sequence"
pub const APPEND_MARKER: &str = "-";

/// Path within a state document tree
///
/// Parsed from strings such as `/state/history/-`. Empty segments are
/// dropped, so `/state//grs` and `state/grs/` address the same node as
/// `/state/grs`.
///
/// # Examples
/// - `/kernel/policy` → `["kernel", "policy"]`
/// - `/state/history/0` → `["state", "history", "0"]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointerPath(Vec<String>);

impl PointerPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Parse a slash-delimited pointer
    #[must_use]
    pub fn parse(pointer: &str) -> Self {
        Self(
            pointer
                .split('/')
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Empty path (document root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Check if this path is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Whether the final segment addresses a sequence slot
    ///
    /// True for the append marker and for purely numeric segments.
    #[must_use]
    pub fn targets_sequence_slot(&self) -> bool {
        self.last()
            .is_some_and(|seg| seg == APPEND_MARKER || index_segment(seg).is_some())
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Interpret a segment as a sequence index
///
/// Only plain ASCII digit runs qualify; signs and whitespace do not.
#[must_use]
pub fn index_segment(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl Display for PointerPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.0 {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for PointerPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for PointerPath {
    fn from(pointer: &str) -> Self {
        Self::parse(pointer)
    }
}

impl From<Vec<String>> for PointerPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl Default for PointerPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors while resolving a pointer against a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    /// Pointer has no segments
    #[error("pointer '{0}' addresses the document root")]
    EmptyPath(String),

    /// Index past the end of a sequence
    #[error("index {index} out of range at '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    /// Non-numeric segment used against a sequence
    #[error("segment '{segment}' is not a sequence index at '{path}'")]
    InvalidIndex { path: String, segment: String },

    /// Tried to descend into a scalar
    #[error("node at '{path}' is not a container")]
    NotAContainer { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_parse_drops_empty_segments() {
        let path = PointerPath::parse("/state//history/");
        assert_eq!(path.segments(), &["state", "history"]);
    }

    #[test]
    fn pointer_root() {
        let path = PointerPath::parse("/");
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "/");
        assert!(path.parent().is_none());
    }

    #[test]
    fn pointer_display_roundtrips_canonical_form() {
        let path = PointerPath::parse("/kernel/policy/allowed_paths");
        assert_eq!(path.to_string(), "/kernel/policy/allowed_paths");
    }

    #[test]
    fn pointer_parent_and_last() {
        let path = PointerPath::parse("/state/history/-");
        assert_eq!(path.last(), Some("-"));
        assert_eq!(path.parent().unwrap().to_string(), "/state/history");
    }

    #[test]
    fn pointer_child() {
        let path = PointerPath::parse("/state").child("constraints");
        assert_eq!(path.segments(), &["state", "constraints"]);
    }

    #[test]
    fn pointer_is_prefix_of() {
        let a = PointerPath::parse("/state");
        let b = PointerPath::parse("/state/grs/score");
        assert!(a.is_prefix_of(&b));
        assert!(!b.is_prefix_of(&a));
    }

    #[test]
    fn pointer_sequence_slot_detection() {
        assert!(PointerPath::parse("/state/history/-").targets_sequence_slot());
        assert!(PointerPath::parse("/state/history/12").targets_sequence_slot());
        assert!(!PointerPath::parse("/state/history").targets_sequence_slot());
        assert!(!PointerPath::parse("/state/+1").targets_sequence_slot());
        assert!(!PointerPath::root().targets_sequence_slot());
    }

    #[test]
    fn index_segment_rejects_signs() {
        assert_eq!(index_segment("3"), Some(3));
        assert_eq!(index_segment("-1"), None);
        assert_eq!(index_segment(""), None);
        assert_eq!(index_segment("1a"), None);
    }
}
