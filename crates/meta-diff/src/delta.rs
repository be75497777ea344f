//! Structured diff results.
//!
//! A [`Delta`] mirrors the shape of the documents it was computed from:
//! mappings become [`Delta::Object`], arrays become [`Delta::Array`] with
//! one [`ArrayEntry`] per added, removed or changed element, and leaves carry
//! the old and/or new value. Every leaf holds enough to render "changed from
//! X to Y" without going back to the source documents.

use indexmap::IndexMap;
use meta_diff_path_keys::escape_segment;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::identity::ElementIdentity;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Delta {
    Added { value: Value },
    Removed { value: Value },
    Modified { old: Value, new: Value },
    Object { entries: IndexMap<String, Delta> },
    Array { entries: Vec<ArrayEntry> },
}

/// One element-level change inside an array delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayEntry {
    pub identity: ElementIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_index: Option<usize>,
    pub delta: Delta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn symbol(&self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Modified => '~',
        }
    }
}

/// One step from the document root towards a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Element(ElementIdentity),
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PathSegment::Key(key) => serializer.serialize_str(key),
            PathSegment::Element(identity) => serializer.collect_str(&format_args!("[{identity}]")),
        }
    }
}

/// A single leaf change with its full path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub path: Vec<PathSegment>,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
}

impl Change {
    /// Renders the path as `a.b[name=X].c`, escaping dots inside keys.
    pub fn dotted_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(&escape_segment(key));
                }
                PathSegment::Element(identity) => {
                    out.push('[');
                    out.push_str(&identity.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

impl Delta {
    /// Flattens the delta into leaf changes, depth-first.
    pub fn changes(&self) -> Vec<Change> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.collect_changes(&mut path, &mut out);
        out
    }

    /// Number of leaf changes.
    pub fn change_count(&self) -> usize {
        match self {
            Delta::Added { .. } | Delta::Removed { .. } | Delta::Modified { .. } => 1,
            Delta::Object { entries } => entries.values().map(Delta::change_count).sum(),
            Delta::Array { entries } => entries.iter().map(|e| e.delta.change_count()).sum(),
        }
    }

    /// Looks up the delta at a key of an object delta.
    pub fn get(&self, key: &str) -> Option<&Delta> {
        match self {
            Delta::Object { entries } => entries.get(key),
            _ => None,
        }
    }

    fn collect_changes(&self, path: &mut Vec<PathSegment>, out: &mut Vec<Change>) {
        match self {
            Delta::Added { value } => out.push(Change {
                path: path.clone(),
                kind: ChangeKind::Added,
                old: None,
                new: Some(value.clone()),
            }),
            Delta::Removed { value } => out.push(Change {
                path: path.clone(),
                kind: ChangeKind::Removed,
                old: Some(value.clone()),
                new: None,
            }),
            Delta::Modified { old, new } => out.push(Change {
                path: path.clone(),
                kind: ChangeKind::Modified,
                old: Some(old.clone()),
                new: Some(new.clone()),
            }),
            Delta::Object { entries } => {
                for (key, child) in entries {
                    path.push(PathSegment::Key(key.clone()));
                    child.collect_changes(path, out);
                    path.pop();
                }
            }
            Delta::Array { entries } => {
                for entry in entries {
                    path.push(PathSegment::Element(entry.identity.clone()));
                    entry.delta.collect_changes(path, out);
                    path.pop();
                }
            }
        }
    }
}
