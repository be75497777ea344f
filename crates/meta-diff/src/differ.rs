//! Structural differ for nested metadata documents.
//!
//! Mappings are compared key by key and arrays element by element, with
//! elements paired through an [`IdentityPolicy`] so that reordering an
//! array, or inserting into its middle, only reports the elements that were
//! really added, removed or changed.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use meta_diff_json_equal::deep_equal;
use serde_json::{Map, Value};

use crate::delta::{ArrayEntry, Delta};
use crate::identity::{ElementIdentity, IdentityPolicy};

#[derive(Debug, Clone, Default)]
pub struct Differ {
    identity: IdentityPolicy,
}

impl Differ {
    pub fn new(identity: IdentityPolicy) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &IdentityPolicy {
        &self.identity
    }

    /// Computes the delta from `baseline` to `modified`.
    ///
    /// Returns `None` when the documents are equal. Key order inside
    /// mappings is never significant.
    pub fn diff(&self, baseline: &Value, modified: &Value) -> Option<Delta> {
        let delta = self.diff_values(baseline, modified);
        tracing::debug!(
            changes = delta.as_ref().map(Delta::change_count).unwrap_or(0),
            "diffed documents"
        );
        delta
    }

    fn diff_values(&self, baseline: &Value, modified: &Value) -> Option<Delta> {
        match (baseline, modified) {
            (Value::Object(base), Value::Object(next)) => self
                .diff_objects(base, next)
                .map(|entries| Delta::Object { entries }),
            (Value::Array(base), Value::Array(next)) => self
                .diff_arrays(base, next)
                .map(|entries| Delta::Array { entries }),
            _ if deep_equal(baseline, modified) => None,
            _ => Some(Delta::Modified {
                old: baseline.clone(),
                new: modified.clone(),
            }),
        }
    }

    fn diff_objects(
        &self,
        base: &Map<String, Value>,
        next: &Map<String, Value>,
    ) -> Option<IndexMap<String, Delta>> {
        let mut entries = IndexMap::new();
        for (key, old) in base {
            match next.get(key) {
                Some(new) => {
                    if let Some(delta) = self.diff_values(old, new) {
                        entries.insert(key.clone(), delta);
                    }
                }
                None => {
                    entries.insert(key.clone(), Delta::Removed { value: old.clone() });
                }
            }
        }
        for (key, new) in next {
            if !base.contains_key(key) {
                entries.insert(key.clone(), Delta::Added { value: new.clone() });
            }
        }
        (!entries.is_empty()).then_some(entries)
    }

    fn diff_arrays(&self, base: &[Value], next: &[Value]) -> Option<Vec<ArrayEntry>> {
        let base_ids: Vec<ElementIdentity> = base
            .iter()
            .enumerate()
            .map(|(index, element)| self.identity.identify(element, index))
            .collect();

        // Duplicate identities pair up in order of appearance.
        let mut unmatched: HashMap<&ElementIdentity, VecDeque<usize>> = HashMap::new();
        for (index, identity) in base_ids.iter().enumerate() {
            unmatched.entry(identity).or_default().push_back(index);
        }

        let mut matched = vec![false; base.len()];
        let mut entries = Vec::new();
        for (index, element) in next.iter().enumerate() {
            let identity = self.identity.identify(element, index);
            match unmatched
                .get_mut(&identity)
                .and_then(VecDeque::pop_front)
            {
                Some(base_index) => {
                    matched[base_index] = true;
                    tracing::trace!(%identity, base_index, index, "paired array elements");
                    if let Some(delta) = self.diff_values(&base[base_index], element) {
                        entries.push(ArrayEntry {
                            identity,
                            base_index: Some(base_index),
                            modified_index: Some(index),
                            delta,
                        });
                    }
                }
                None => entries.push(ArrayEntry {
                    identity,
                    base_index: None,
                    modified_index: Some(index),
                    delta: Delta::Added {
                        value: element.clone(),
                    },
                }),
            }
        }

        for (index, element) in base.iter().enumerate() {
            if !matched[index] {
                entries.push(ArrayEntry {
                    identity: base_ids[index].clone(),
                    base_index: Some(index),
                    modified_index: None,
                    delta: Delta::Removed {
                        value: element.clone(),
                    },
                });
            }
        }

        (!entries.is_empty()).then_some(entries)
    }
}

/// Diffs two documents with the default identity policy.
pub fn diff(baseline: &Value, modified: &Value) -> Option<Delta> {
    Differ::default().diff(baseline, modified)
}
