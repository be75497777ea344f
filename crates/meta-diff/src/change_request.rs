//! Change requests: partial updates expressed as dotted paths.
//!
//! A change request pairs a path-keyed map of values with a discriminator
//! saying whether those values are added to the target record or removed
//! from it.

use meta_diff_json_equal::deep_equal;
use meta_diff_path_keys::{collapse_with, PathPolicy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::delta::Delta;
use crate::differ::Differ;
use crate::error::{DiffError, Result};
use crate::subset::{extract_subset, presence_shape};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathUpdateType {
    #[default]
    Addition,
    Removal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub path_updates: Map<String, Value>,
    #[serde(default)]
    pub path_update_type: PathUpdateType,
    #[serde(default, rename = "metaDataId", skip_serializing_if = "Option::is_none")]
    pub metadata_id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub metadata_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChangeRequest {
    pub fn new(path_updates: Map<String, Value>, path_update_type: PathUpdateType) -> Self {
        Self {
            path_updates,
            path_update_type,
            metadata_id: None,
            metadata_type: None,
            note: None,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The nested document the dotted path updates describe.
    pub fn shape(&self, policy: PathPolicy) -> Result<Map<String, Value>> {
        Ok(collapse_with(&self.path_updates, policy)?)
    }

    /// Applies the change to `document` and returns the updated copy.
    ///
    /// Additions merge mappings recursively, append array elements that are
    /// not present yet and overwrite everything else. Removals drop array
    /// elements equal to a listed one, recurse into mappings and delete any
    /// other targeted key.
    pub fn apply(&self, document: &Value, policy: PathPolicy) -> Result<Value> {
        let base = as_document(document)?;
        let shape = self.shape(policy)?;
        tracing::debug!(
            kind = ?self.path_update_type,
            paths = self.path_updates.len(),
            "applying change request"
        );
        let mut target = base.clone();
        match self.path_update_type {
            PathUpdateType::Addition => merge_into(&mut target, &shape),
            PathUpdateType::Removal => remove_from(&mut target, &shape),
        }
        Ok(Value::Object(target))
    }

    /// Diffs the change's shape against the matching subset of `document`.
    ///
    /// This is how a pending change request is reviewed against the current
    /// revision: only the fields the request touches are compared.
    pub fn compare(&self, document: &Value, differ: &Differ, policy: PathPolicy) -> Result<Option<Delta>> {
        let base = as_document(document)?;
        let shape = self.shape(policy)?;
        let before = extract_subset(base, &shape);
        Ok(differ.diff(&Value::Object(before), &Value::Object(shape)))
    }

    /// Diffs the touched fields of `document` before and after [`apply`].
    ///
    /// Fields are selected by presence in the request, so an update that
    /// sets a flag to `false` or clears a value to `""` is still reported.
    ///
    /// [`apply`]: ChangeRequest::apply
    pub fn effective_change(
        &self,
        document: &Value,
        differ: &Differ,
        policy: PathPolicy,
    ) -> Result<Option<Delta>> {
        let base = as_document(document)?;
        let shape = presence_shape(&self.shape(policy)?);
        let applied = self.apply(document, policy)?;
        let after = match &applied {
            Value::Object(map) => extract_subset(map, &shape),
            _ => Map::new(),
        };
        let before = extract_subset(base, &shape);
        Ok(differ.diff(&Value::Object(before), &Value::Object(after)))
    }
}

fn as_document(document: &Value) -> Result<&Map<String, Value>> {
    match document {
        Value::Object(map) => Ok(map),
        other => Err(DiffError::InvalidDocument(format!(
            "change requests apply to objects, got {}",
            kind_name(other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn merge_into(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        let merged = match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_into(existing, incoming);
                true
            }
            (Some(Value::Array(existing)), Value::Array(incoming)) => {
                for item in incoming {
                    if !existing.iter().any(|e| deep_equal(e, item)) {
                        existing.push(item.clone());
                    }
                }
                true
            }
            _ => false,
        };
        if !merged {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn remove_from(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        let handled = match (target.get_mut(key), value) {
            (None, _) => true,
            (Some(Value::Object(existing)), Value::Object(nested)) if !nested.is_empty() => {
                remove_from(existing, nested);
                true
            }
            (Some(Value::Array(existing)), Value::Array(listed)) => {
                existing.retain(|e| !listed.iter().any(|l| deep_equal(e, l)));
                true
            }
            _ => false,
        };
        if !handled {
            target.shift_remove(key);
        }
    }
}
