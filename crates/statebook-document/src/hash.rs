//! Document fingerprints
//!
//! Provides [`DocumentHash`], a 32-byte Blake3 digest of a document's
//! canonical JSON encoding. Two documents with equal hashes serialize to
//! identical bytes.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte document hash (Blake3)
///
/// Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentHash([u8; 32]);

impl DocumentHash {
    /// Create a new hash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create hash from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| HashError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Compute Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Hash the compact JSON encoding of a value
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn of_json<T>(value: &T) -> Result<Self, HashError>
    where
        T: serde::Serialize,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for DocumentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for DocumentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl serde::Serialize for DocumentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for DocumentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors related to document hashes
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Wrong byte length
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex decoding failed
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// JSON encoding failed
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = DocumentHash::compute(b"statebook");
        let b = DocumentHash::compute(b"statebook");
        assert_eq!(a, b);
        assert_ne!(a, DocumentHash::compute(b"other"));
    }

    #[test]
    fn hash_hex_roundtrip() {
        let hash = DocumentHash::compute(b"x");
        let parsed: DocumentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
        assert_eq!(hash.short().len(), 16);
    }

    #[test]
    fn hash_from_slice_wrong_length() {
        let err = DocumentHash::from_slice(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, HashError::InvalidLength { actual: 4, .. }));
    }

    #[test]
    fn hash_of_json_ignores_formatting() {
        let a: serde_json::Value = serde_json::from_str(r#"{ "a" : 1 }"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"a":1}"#).unwrap();
        assert_eq!(DocumentHash::of_json(&a).unwrap(), DocumentHash::of_json(&b).unwrap());
    }
}
