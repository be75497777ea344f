//! Restricting a document to the fields a change touches.
//!
//! A change request only carries the fields it modifies. Diffing it against
//! the whole current record would report every other field as removed, so
//! the current record is first cut down to the change's shape.

use meta_diff_json_equal::is_truthy;
use serde_json::{Map, Value};

/// Returns the values of `baseline` at the paths present in `shape`.
///
/// A key is kept when it is truthy in `shape` and present in `baseline`.
/// When the baseline value is a mapping the shape value must be a mapping
/// too, and the extraction recurses; otherwise the baseline value (scalar
/// or array) is copied as is. Values are always taken from `baseline`.
///
/// ```
/// use meta_diff::extract_subset;
/// use serde_json::json;
///
/// let baseline = json!({"a": "b", "c": {"d": "val", "ign": "x"}, "ign": [1, 2, 3]});
/// let shape = json!({"a": "x", "c": {"d": "changed"}, "extra": [1]});
/// let subset = extract_subset(baseline.as_object().unwrap(), shape.as_object().unwrap());
/// assert_eq!(serde_json::Value::Object(subset), json!({"a": "b", "c": {"d": "val"}}));
/// ```
pub fn extract_subset(baseline: &Map<String, Value>, shape: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, shape_value) in shape {
        if !is_truthy(shape_value) {
            continue;
        }
        if let Some(value) = baseline.get(key).and_then(|base| extract_value(base, shape_value)) {
            out.insert(key.clone(), value);
        }
    }
    out
}

/// Replaces every leaf of `shape` with `true`, keeping nested mappings.
///
/// Restricting by the result selects keys by presence alone, so a shape that
/// sets a field to `false`, `0` or `""` still selects it.
pub(crate) fn presence_shape(shape: &Map<String, Value>) -> Map<String, Value> {
    shape
        .iter()
        .map(|(key, value)| {
            let marker = match value {
                Value::Object(child) => Value::Object(presence_shape(child)),
                _ => Value::Bool(true),
            };
            (key.clone(), marker)
        })
        .collect()
}

fn extract_value(base: &Value, shape: &Value) -> Option<Value> {
    match (base, shape) {
        (Value::Object(base), Value::Object(shape)) => {
            let mut out = Map::new();
            for (key, child) in base {
                let Some(shape_child) = shape.get(key) else {
                    continue;
                };
                if !is_truthy(shape_child) {
                    continue;
                }
                if let Some(value) = extract_value(child, shape_child) {
                    out.insert(key.clone(), value);
                }
            }
            Some(Value::Object(out))
        }
        // A mapping paired with a scalar or array shape does not match.
        (Value::Object(_), _) => None,
        (other, _) => Some(other.clone()),
    }
}
