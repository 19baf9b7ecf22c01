//! The state document
//!
//! [`StateDocument`] is a JSON tree whose root is always a mapping. Reads go
//! through [`PointerPath`]s; the two write primitives here (`set_value` and
//! `insert_into_sequence`) carry the structural rules that patch operations
//! rely on. Policy checks live with the caller.

use crate::hash::DocumentHash;
use crate::pointer::{index_segment, PointerError, PointerPath, APPEND_MARKER};
use crate::records::ProjectInfo;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Root-level key holding save metadata
pub const META_KEY: &str = "meta";

/// Key under [`META_KEY`] refreshed on every save
pub const UPDATED_KEY: &str = "updated";

/// Structured project/policy/solver state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct StateDocument {
    root: Value,
}

impl StateDocument {
    /// Wrap a JSON value
    ///
    /// # Errors
    /// Returns error if `root` is not a JSON object
    pub fn new(root: Value) -> Result<Self, DocumentError> {
        if !root.is_object() {
            return Err(DocumentError::RootNotObject {
                found: value_kind(&root),
            });
        }
        Ok(Self { root })
    }

    /// Document with an empty root mapping
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Minimal document used when nothing has been persisted yet
    #[must_use]
    pub fn skeleton() -> Self {
        Self {
            root: json!({
                "kernel": {
                    "policy": {
                        "allowed_paths": [
                            "/state/*",
                            "/temp/*",
                            "/connections/*",
                            "/gaps/*",
                            "/logs/decisions/*"
                        ],
                        "thresholds": { "grs": 0.80 },
                        "kernel_locked": true
                    }
                },
                "project": { "id": "", "goal": "", "deliverable": "", "success_checks": [] },
                "state": {
                    "svec": {},
                    "grs": { "score": 0.0 },
                    "next_action": "",
                    "open_questions": [],
                    "unknowns": []
                },
                "connections": { "motifs": [] }
            }),
        }
    }

    /// Parse from JSON text
    ///
    /// # Errors
    /// Returns error on malformed JSON or a non-object root
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        let root: Value = serde_json::from_str(text)?;
        Self::new(root)
    }

    /// Pretty-printed JSON text
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Root value
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Consume into the root value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Content fingerprint
    #[must_use]
    pub fn hash(&self) -> DocumentHash {
        let bytes = serde_json::to_vec(&self.root).unwrap_or_default();
        DocumentHash::compute(&bytes)
    }

    /// Get value at path
    #[must_use]
    pub fn get(&self, path: &PointerPath) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.iter() {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(index_segment(segment)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Get value at a pointer string
    #[inline]
    #[must_use]
    pub fn get_pointer(&self, pointer: &str) -> Option<&Value> {
        self.get(&PointerPath::parse(pointer))
    }

    /// Whether a node exists at path
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &PointerPath) -> bool {
        self.get(path).is_some()
    }

    /// Deserialize the subtree at `pointer`
    ///
    /// Missing or ill-typed subtrees yield `None`.
    #[must_use]
    pub fn section<T: DeserializeOwned>(&self, pointer: &str) -> Option<T> {
        self.get_pointer(pointer)
            .and_then(|value| T::deserialize(value).ok())
    }

    /// Typed view of `/project`
    #[must_use]
    pub fn project(&self) -> ProjectInfo {
        self.section("/project").unwrap_or_default()
    }

    /// Project identifier, empty when unset
    #[must_use]
    pub fn project_id(&self) -> &str {
        self.get_pointer("/project/id")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Timestamp of the last save, if recorded
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.root.get(META_KEY)?.get(UPDATED_KEY)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }

    /// Refresh `meta.updated`
    pub fn stamp_updated(&mut self, at: DateTime<Utc>) {
        if let Value::Object(root) = &mut self.root {
            let meta = root
                .entry(META_KEY)
                .or_insert_with(|| Value::Object(Map::new()));
            if !meta.is_object() {
                *meta = Value::Object(Map::new());
            }
            if let Value::Object(meta) = meta {
                meta.insert(UPDATED_KEY.to_string(), Value::String(at.to_rfc3339()));
            }
        }
    }

    /// Set the value at `path`
    ///
    /// Missing or scalar intermediate mapping entries are replaced by empty
    /// mappings. Sequences are indexed but never created here.
    ///
    /// # Errors
    /// - `PointerError::EmptyPath` for the root pointer
    /// - `PointerError::IndexOutOfRange` / `InvalidIndex` for bad sequence access
    /// - `PointerError::NotAContainer` when descending into a scalar
    pub fn set_value(&mut self, path: &PointerPath, value: Value) -> Result<(), PointerError> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Err(PointerError::EmptyPath(path.to_string()));
        };

        let mut current = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            current = match current {
                Value::Object(map) => {
                    let slot = map
                        .entry(segment.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if !(slot.is_object() || slot.is_array()) {
                        *slot = Value::Object(Map::new());
                    }
                    slot
                }
                Value::Array(items) => {
                    let index = sequence_index(path, depth, segment, items.len())?;
                    &mut items[index]
                }
                _ => return Err(not_a_container(path, depth)),
            };
        }

        match current {
            Value::Object(map) => {
                map.insert(last.clone(), value);
                Ok(())
            }
            Value::Array(items) => {
                let index = sequence_index(path, parents.len(), last, items.len())?;
                items[index] = value;
                Ok(())
            }
            _ => Err(not_a_container(path, parents.len())),
        }
    }

    /// Insert into the sequence addressed by `path`
    ///
    /// The final segment is either [`APPEND_MARKER`] or an index. An index
    /// past the end appends. When the container is missing, an empty sequence
    /// is created first. When the container is a mapping, the final segment
    /// names a key holding a sequence, which receives the value.
    ///
    /// # Errors
    /// Same conditions as [`set_value`](Self::set_value)
    pub fn insert_into_sequence(
        &mut self,
        path: &PointerPath,
        value: Value,
    ) -> Result<(), PointerError> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Err(PointerError::EmptyPath(path.to_string()));
        };

        let mut current = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let holds_sequence = depth + 1 == parents.len();
            current = match current {
                Value::Object(map) => map.entry(segment.clone()).or_insert_with(|| {
                    if holds_sequence {
                        Value::Array(Vec::new())
                    } else {
                        Value::Object(Map::new())
                    }
                }),
                Value::Array(items) => {
                    let index = sequence_index(path, depth, segment, items.len())?;
                    &mut items[index]
                }
                _ => return Err(not_a_container(path, depth)),
            };
        }

        match current {
            Value::Array(items) => {
                if last == APPEND_MARKER {
                    items.push(value);
                } else {
                    let index = index_segment(last).ok_or_else(|| PointerError::InvalidIndex {
                        path: path.to_string(),
                        segment: last.clone(),
                    })?;
                    let index = index.min(items.len());
                    items.insert(index, value);
                }
                Ok(())
            }
            Value::Object(map) => {
                let slot = map
                    .entry(last.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !slot.is_array() {
                    *slot = Value::Array(Vec::new());
                }
                if let Value::Array(items) = slot {
                    items.push(value);
                }
                Ok(())
            }
            _ => Err(not_a_container(path, parents.len())),
        }
    }
}

impl Default for StateDocument {
    fn default() -> Self {
        Self::skeleton()
    }
}

impl TryFrom<Value> for StateDocument {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StateDocument> for Value {
    fn from(document: StateDocument) -> Self {
        document.root
    }
}

fn sequence_index(
    path: &PointerPath,
    depth: usize,
    segment: &str,
    len: usize,
) -> Result<usize, PointerError> {
    let at = prefix_string(path, depth);
    let index = index_segment(segment).ok_or_else(|| PointerError::InvalidIndex {
        path: at.clone(),
        segment: segment.to_string(),
    })?;
    if index >= len {
        return Err(PointerError::IndexOutOfRange {
            path: at,
            index,
            len,
        });
    }
    Ok(index)
}

fn not_a_container(path: &PointerPath, depth: usize) -> PointerError {
    PointerError::NotAContainer {
        path: prefix_string(path, depth),
    }
}

fn prefix_string(path: &PointerPath, depth: usize) -> String {
    PointerPath::new(path.segments()[..depth].to_vec()).to_string()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Errors constructing or encoding a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Root must be a mapping
    #[error("document root must be a mapping, found {found}")]
    RootNotObject { found: &'static str },

    /// JSON syntax or encoding failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
