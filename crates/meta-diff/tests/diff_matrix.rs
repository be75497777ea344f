//! Differ behaviour over metadata revisions.

use meta_diff::{diff, prepare, Change, ChangeKind, Delta, IgnoreKeys};
use proptest::prelude::*;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// No-op diffs
// ---------------------------------------------------------------------------

#[test]
fn identical_revision_has_no_diff() {
    let doc = json!({
        "type": "saml20-sp",
        "data": {
            "entityid": "https://sp.example.org",
            "allowedEntities": [{"name": "https://idp1"}, {"name": "https://idp2"}],
            "arp": {"enabled": true, "attributes": {"urn:mail": [{"source": "idp", "value": "*"}]}}
        }
    });
    assert_eq!(diff(&doc, &doc), None);
}

#[test]
fn revisions_differing_only_in_ignored_keys() {
    let a = json!({"id": "1", "revision": {"number": 1, "created": "2020"}, "data": {"b": 1, "a": 2}});
    let b = json!({"id": "1", "revision": {"number": 2, "created": "2021"}, "data": {"a": 2, "b": 1}});
    assert!(diff(&a, &b).is_some());
    let ignore = IgnoreKeys::default();
    assert_eq!(diff(&prepare(&a, &ignore), &prepare(&b, &ignore)), None);
}

// ---------------------------------------------------------------------------
// Scalar changes
// ---------------------------------------------------------------------------

#[test]
fn single_scalar_change_is_symmetric() {
    let a = json!({"data": {"state": "testaccepted", "entityid": "https://sp"}});
    let b = json!({"data": {"state": "prodaccepted", "entityid": "https://sp"}});

    let forward = diff(&a, &b).unwrap().changes();
    assert_eq!(forward.len(), 1);
    assert_eq!(forward[0].dotted_path(), "data.state");
    assert_eq!(forward[0].kind, ChangeKind::Modified);
    assert_eq!(forward[0].old, Some(json!("testaccepted")));
    assert_eq!(forward[0].new, Some(json!("prodaccepted")));

    let backward = diff(&b, &a).unwrap().changes();
    assert_eq!(backward.len(), 1);
    assert_eq!(backward[0].dotted_path(), "data.state");
    assert_eq!(backward[0].old, Some(json!("prodaccepted")));
    assert_eq!(backward[0].new, Some(json!("testaccepted")));
}

#[test]
fn added_and_removed_keys() {
    let a = json!({"metaDataFields": {"name:en": "SP", "logo:0:url": "x"}});
    let b = json!({"metaDataFields": {"name:en": "SP", "description:en": "d"}});
    let delta = diff(&a, &b).unwrap();
    let fields = delta.get("metaDataFields").unwrap();
    assert_eq!(
        fields.get("logo:0:url"),
        Some(&Delta::Removed { value: json!("x") })
    );
    assert_eq!(
        fields.get("description:en"),
        Some(&Delta::Added { value: json!("d") })
    );
    assert_eq!(fields.get("name:en"), None);
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

#[test]
fn array_elements_matched_by_identity() {
    let a = json!({"list": [{"name": "A", "level": 1}, {"name": "B", "level": 2}]});
    let b = json!({"list": [{"name": "B", "level": 3}, {"name": "C", "level": 1}]});

    let Some(Delta::Object { entries }) = diff(&a, &b) else {
        panic!("expected object delta");
    };
    let Some(Delta::Array { entries }) = entries.get("list") else {
        panic!("expected array delta at list");
    };
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].identity.to_string(), "name=B");
    assert_eq!((entries[0].base_index, entries[0].modified_index), (Some(1), Some(0)));
    assert_eq!(
        entries[0].delta.get("level"),
        Some(&Delta::Modified { old: json!(2), new: json!(3) })
    );

    assert_eq!(entries[1].identity.to_string(), "name=C");
    assert_eq!(
        entries[1].delta,
        Delta::Added { value: json!({"name": "C", "level": 1}) }
    );

    assert_eq!(entries[2].identity.to_string(), "name=A");
    assert_eq!(
        entries[2].delta,
        Delta::Removed { value: json!({"name": "A", "level": 1}) }
    );
}

#[test]
fn insertion_in_the_middle_reports_one_addition() {
    let a = json!({"allowedEntities": [{"name": "a"}, {"name": "c"}, {"name": "d"}]});
    let b = json!({"allowedEntities": [{"name": "a"}, {"name": "b"}, {"name": "c"}, {"name": "d"}]});
    let changes = diff(&a, &b).unwrap().changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Added);
    assert_eq!(changes[0].dotted_path(), "allowedEntities[name=b]");
}

#[test]
fn arp_attribute_values_matched_by_source_then_value() {
    let a = json!({"arp": {"attributes": {"urn:mail": [{"source": "idp", "value": "*"}]}}});
    let b = json!({"arp": {"attributes": {"urn:mail": [
        {"source": "idp", "value": "*"},
        {"source": "sab", "value": "*"}
    ]}}});
    let changes = diff(&a, &b).unwrap().changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].dotted_path(), "arp.attributes.urn:mail[source=sab]");
}

#[test]
fn scalar_arrays_report_values() {
    let a = json!({"scopes": ["openid", "email"]});
    let b = json!({"scopes": ["email", "profile"]});
    let changes = diff(&a, &b).unwrap().changes();
    let summary: Vec<(ChangeKind, String)> = changes
        .iter()
        .map(|c| (c.kind, c.dotted_path()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ChangeKind::Added, "scopes[\"profile\"]".to_string()),
            (ChangeKind::Removed, "scopes[\"openid\"]".to_string()),
        ]
    );
}

#[test]
fn integral_float_identity_pairs_with_integer() {
    let a = json!({"l": [{"level": 1, "x": "same"}]});
    let b = json!({"l": [{"level": 1.0, "x": "same"}]});
    assert_eq!(diff(&a, &b), None);

    let c = json!({"l": [{"level": 1.0, "x": "other"}]});
    let changes = diff(&a, &c).unwrap().changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Modified);
    assert_eq!(changes[0].dotted_path(), "l[level=1].x");
}

#[test]
fn reversed_diff_flips_kinds_and_values() {
    let a = json!({"keep": 1, "gone": "x", "list": [{"name": "A"}, {"name": "B", "v": 1}]});
    let b = json!({"keep": 2, "new": true, "list": [{"name": "B", "v": 2}, {"name": "C"}]});
    let backward = summarize(diff(&b, &a).unwrap().changes(), false);
    assert_eq!(
        backward,
        summarize(diff(&a, &b).unwrap().changes(), true)
    );
    assert!(backward.contains(&json!(["new", ChangeKind::Removed, true, null]).to_string()));
    assert!(backward.contains(&json!(["list[name=A]", ChangeKind::Added, null, {"name": "A"}]).to_string()));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn document_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i16>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,5}", inner, 0..5)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

/// Sorted `[path, kind, old, new]` lines, optionally as seen from the other side.
fn summarize(changes: Vec<Change>, reversed: bool) -> Vec<String> {
    let mut lines: Vec<String> = changes
        .into_iter()
        .map(|change| {
            let path = change.dotted_path();
            let (kind, old, new) = if reversed {
                let kind = match change.kind {
                    ChangeKind::Added => ChangeKind::Removed,
                    ChangeKind::Removed => ChangeKind::Added,
                    ChangeKind::Modified => ChangeKind::Modified,
                };
                (kind, change.new, change.old)
            } else {
                (change.kind, change.old, change.new)
            };
            json!([path, kind, old, new]).to_string()
        })
        .collect();
    lines.sort();
    lines
}

proptest! {
    #[test]
    fn diff_with_itself_is_empty(doc in document_strategy()) {
        let ignore = IgnoreKeys::none();
        prop_assert_eq!(diff(&prepare(&doc, &ignore), &prepare(&doc, &ignore)), None);
    }

    #[test]
    fn every_change_kind_flips_when_reversed(a in document_strategy(), b in document_strategy()) {
        let forward = diff(&a, &b).map(|d| d.changes()).unwrap_or_default();
        let backward = diff(&b, &a).map(|d| d.changes()).unwrap_or_default();
        prop_assert_eq!(summarize(backward, false), summarize(forward, true));
    }
}
