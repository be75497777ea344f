//! Preparation applied to documents before they are diffed.
//!
//! Two revisions of the same record routinely differ in bookkeeping fields
//! (identifiers, revision numbers, audit timestamps) and in key order. The
//! differ does not know about either, so callers strip a fixed list of
//! top-level keys and sort mapping keys before calling it.

use serde_json::{Map, Value};

/// Top-level keys removed by [`IgnoreKeys::default`].
pub const DEFAULT_IGNORE_KEYS: [&str; 8] = [
    "id",
    "eid",
    "revisionid",
    "user",
    "created",
    "ip",
    "revisionnote",
    "revision",
];

/// Recursively sorts mapping keys. Array order is preserved.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, child)| (key.clone(), canonicalize(child)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Keys that never take part in a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreKeys(Vec<String>);

impl Default for IgnoreKeys {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE_KEYS)
    }
}

impl IgnoreKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Returns a copy of `value` without the ignored top-level keys.
    pub fn strip(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(key, _)| !self.contains(key))
                    .map(|(key, child)| (key.clone(), child.clone()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Strips ignored keys and canonicalizes key order.
pub fn prepare(value: &Value, ignore: &IgnoreKeys) -> Value {
    canonicalize(&ignore.strip(value))
}
