//! Dotted path-key utilities for metadata documents.
//!
//! Change requests express partial updates as a flat map from dotted paths
//! (`"metaDataFields.name:en"`) to values. This crate converts between that
//! flat form and the nested form:
//!
//! - [`flatten`] walks nested mappings depth-first and joins keys with `.`,
//!   escaping any literal `.` inside a key as `@`.
//! - [`collapse`] splits dotted keys and rebuilds the nested mappings.
//! - [`unflatten`] is [`collapse`] plus segment unescaping, the inverse of
//!   [`flatten`] for keys that do not themselves contain `@`.
//!
//! Arrays are never traversed; they are leaves on both sides.
//!
//! The escape is not reversible for a key that already holds a literal `@`:
//! `{"contact": {"mail@org": "x"}}` flattens to `contact.mail@org` and
//! unflattens to `{"contact": {"mail.org": "x"}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Stand-in for a literal `.` inside a single key segment.
pub const ESCAPED_SEPARATOR: char = '@';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathKeyError {
    #[error("path {path:?} contains an empty segment")]
    EmptySegment { path: String },
}

/// How [`collapse_with`] treats malformed paths.
///
/// Overlapping paths are not malformed. Under either policy they merge into
/// the same nested mapping and the later entry wins at a shared leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathPolicy {
    /// Reject paths with empty segments.
    #[default]
    Strict,
    /// Keep empty segments as `""` keys.
    Lenient,
}

impl std::fmt::Display for PathPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPolicy::Strict => write!(f, "strict"),
            PathPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

/// Escapes one key segment so it can be joined with `.`.
pub fn escape_segment(segment: &str) -> String {
    if !segment.contains(SEPARATOR) {
        return segment.to_string();
    }
    segment.replace(SEPARATOR, &ESCAPED_SEPARATOR.to_string())
}

/// Restores the literal `.` characters of an escaped key segment.
pub fn unescape_segment(segment: &str) -> String {
    if !segment.contains(ESCAPED_SEPARATOR) {
        return segment.to_string();
    }
    segment.replace(ESCAPED_SEPARATOR, &SEPARATOR.to_string())
}

/// Flattens nested mappings into a path-keyed map.
///
/// Keys come out in depth-first order. Arrays and scalars are leaves. An
/// empty nested mapping is kept as a `{}` leaf so it survives a round trip.
///
/// ```
/// use meta_diff_path_keys::flatten;
/// use serde_json::json;
///
/// let doc = json!({"a": 1, "c": {"c1": "x", "c3": {"c3a": true}}});
/// let flat = flatten(doc.as_object().unwrap());
/// let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
/// assert_eq!(keys, vec!["a", "c.c1", "c.c3.c3a"]);
/// ```
pub fn flatten(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(map, None, &mut out);
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let segment = escape_segment(key);
        let path = match prefix {
            Some(prefix) => format!("{prefix}{SEPARATOR}{segment}"),
            None => segment,
        };
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(child, Some(&path), out),
            _ => {
                out.insert(path, value.clone());
            }
        }
    }
}

/// Collapses a path-keyed map into nested mappings using [`PathPolicy::Strict`].
///
/// Segments are taken verbatim; no unescaping happens in this direction.
/// The input is left untouched and values are never split further.
///
/// Entries that share a prefix merge. When two entries reach the same key,
/// two mappings are merged recursively and anything else is replaced by the
/// later entry, including a scalar sitting where a mapping is needed.
///
/// ```
/// use meta_diff_path_keys::collapse;
/// use serde_json::json;
///
/// let flat = json!({"a.b": 1, "a": {"c": 2}, "g": {"a": 1}, "g.a": 2});
/// let nested = collapse(flat.as_object().unwrap()).unwrap();
/// assert_eq!(
///     serde_json::Value::Object(nested),
///     json!({"a": {"b": 1, "c": 2}, "g": {"a": 2}})
/// );
/// ```
pub fn collapse(map: &Map<String, Value>) -> Result<Map<String, Value>, PathKeyError> {
    collapse_with(map, PathPolicy::Strict)
}

/// Collapses a path-keyed map with an explicit policy.
pub fn collapse_with(
    map: &Map<String, Value>,
    policy: PathPolicy,
) -> Result<Map<String, Value>, PathKeyError> {
    build(map, policy, false)
}

/// Inverse of [`flatten`]: collapses and then unescapes every segment.
///
/// Every `@` is read back as `.`, so a key that held a literal `@` before
/// flattening comes back with a `.` in its place.
pub fn unflatten(
    map: &Map<String, Value>,
    policy: PathPolicy,
) -> Result<Map<String, Value>, PathKeyError> {
    build(map, policy, true)
}

fn build(
    map: &Map<String, Value>,
    policy: PathPolicy,
    unescape: bool,
) -> Result<Map<String, Value>, PathKeyError> {
    let mut out = Map::new();
    for (path, value) in map {
        let segments = split_path(path, policy, unescape)?;
        insert_path(&mut out, path, &segments, value);
    }
    Ok(out)
}

fn split_path(path: &str, policy: PathPolicy, unescape: bool) -> Result<Vec<String>, PathKeyError> {
    let mut segments = Vec::new();
    for segment in path.split(SEPARATOR) {
        if segment.is_empty() && policy == PathPolicy::Strict {
            return Err(PathKeyError::EmptySegment {
                path: path.to_string(),
            });
        }
        segments.push(if unescape {
            unescape_segment(segment)
        } else {
            segment.to_string()
        });
    }
    Ok(segments)
}

fn insert_path(node: &mut Map<String, Value>, path: &str, segments: &[String], value: &Value) {
    let [head, rest @ ..] = segments else {
        return;
    };
    if rest.is_empty() {
        match (node.get_mut(head), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge_into(existing, incoming),
            _ => {
                node.insert(head.clone(), value.clone());
            }
        }
        return;
    }

    let entry = node
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(child) = entry {
        insert_path(child, path, rest, value);
        return;
    }
    tracing::trace!(path, segment = %head, "replacing scalar with mapping");
    let mut child = Map::new();
    insert_path(&mut child, path, rest, value);
    *entry = Value::Object(child);
}

fn merge_into(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(child)) => merge_into(existing, child),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
