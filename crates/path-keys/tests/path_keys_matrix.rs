//! Flatten / collapse matrix and round-trip properties.

use meta_diff_path_keys::{collapse, collapse_with, flatten, unflatten, PathPolicy};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// flatten
// ---------------------------------------------------------------------------

#[test]
fn flatten_nested_object_keys_depth_first() {
    let doc = obj(json!({
        "a": "aValue",
        "b": "bValue",
        "c": {
            "c1": "c1Value",
            "c2": "c2Value",
            "c3": {"c3a": "c3aValue"}
        }
    }));
    let flat = flatten(&doc);
    let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c.c1", "c.c2", "c.c3.c3a"]);
    assert_eq!(flat["c.c3.c3a"], json!("c3aValue"));
}

#[test]
fn flatten_leaves_arrays_alone() {
    let doc = obj(json!({"allowedEntities": [{"name": "idp"}], "arp": {"enabled": true}}));
    let flat = flatten(&doc);
    assert_eq!(
        Value::Object(flat),
        json!({"allowedEntities": [{"name": "idp"}], "arp.enabled": true})
    );
}

#[test]
fn flatten_escapes_dots_in_keys() {
    let doc = obj(json!({"metaDataFields": {"SingleSignOnService.0.Location": "https://x"}}));
    let flat = flatten(&doc);
    assert!(flat.contains_key("metaDataFields.SingleSignOnService@0@Location"));
}

#[test]
fn flatten_keeps_empty_mapping_as_leaf() {
    let doc = obj(json!({"a": {}, "b": {"c": {}}}));
    assert_eq!(Value::Object(flatten(&doc)), json!({"a": {}, "b.c": {}}));
}

// ---------------------------------------------------------------------------
// collapse
// ---------------------------------------------------------------------------

#[test]
fn collapse_dotted_keys() {
    let flat = obj(json!({
        "a.b.c": "val",
        "d.e.f": ["some"],
        "g": {"a": 1},
        "x": "y"
    }));
    let nested = collapse(&flat).unwrap();
    assert_eq!(
        Value::Object(nested),
        json!({
            "a": {"b": {"c": "val"}},
            "d": {"e": {"f": ["some"]}},
            "g": {"a": 1},
            "x": "y"
        })
    );
}

#[test]
fn collapse_does_not_mutate_input() {
    let flat = obj(json!({"a.b": 1, "a.c": [1, 2]}));
    let before = flat.clone();
    let _ = collapse(&flat).unwrap();
    assert_eq!(flat, before);
}

#[test]
fn collapse_duplicate_leaf_last_write_wins() {
    let flat = obj(json!({"a.b": {"c": 1}, "a.b.c": 2}));
    for policy in [PathPolicy::Strict, PathPolicy::Lenient] {
        let nested = collapse_with(&flat, policy).unwrap();
        assert_eq!(Value::Object(nested), json!({"a": {"b": {"c": 2}}}));
    }
}

#[test]
fn collapse_dotted_key_into_mapping_value() {
    let flat = obj(json!({"g": {"a": 1}, "g.a": 2}));
    assert_eq!(Value::Object(collapse(&flat).unwrap()), json!({"g": {"a": 2}}));
}

#[test]
fn collapse_mapping_value_into_dotted_key() {
    let flat = obj(json!({"a.b": 1, "a": {"c": 2}}));
    assert_eq!(
        Value::Object(collapse(&flat).unwrap()),
        json!({"a": {"b": 1, "c": 2}})
    );
}

#[test]
fn collapse_empty_map() {
    assert!(collapse(&Map::new()).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn unflatten_restores_dotted_keys() {
    let doc = obj(json!({"coin:x.y": {"a.b": 1}, "plain": "v"}));
    let back = unflatten(&flatten(&doc), PathPolicy::Strict).unwrap();
    assert_eq!(back, doc);
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z:_-][a-zA-Z0-9:_-]{0,6}"
}

fn document_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 5, |inner| {
        prop::collection::btree_map(key_strategy(), inner, 0..5)
            .prop_map(|entries| Value::Object(entries.into_iter().collect()))
    })
}

fn root_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(key_strategy(), document_strategy(), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn collapse_inverts_flatten(doc in root_strategy()) {
        let flat = flatten(&doc);
        let back = collapse(&flat).unwrap();
        prop_assert_eq!(back, doc);
    }

    #[test]
    fn flatten_inverts_unflatten(doc in root_strategy()) {
        let flat = flatten(&doc);
        let again = flatten(&unflatten(&flat, PathPolicy::Strict).unwrap());
        prop_assert_eq!(again, flat);
    }
}
