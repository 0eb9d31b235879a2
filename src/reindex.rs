//! Reindex / merge of normalized values onto prior entity state
//!
//! A normalized mapping whose keys are all list indices is a sequential
//! list: prior state is discarded and the values are re-enumerated from 0.
//! Any other mapping is deep-merged into the prior value, keeping sibling
//! keys the submission did not touch.

use serde_json::{Map, Value};

/// Check if a key is a list index
///
/// Only non-negative base-10 integers without leading zeros qualify:
/// `"0"`, `"42"` yes; `"007"`, `"3.0"`, `"-1"`, `""` no.
pub fn is_index(key: &str) -> bool {
    let bytes = key.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return false;
    }
    bytes.iter().all(u8::is_ascii_digit)
}

/// Whether every key of `values` is a list index
pub fn is_sequential(values: &Map<String, Value>) -> bool {
    values.keys().all(|key| is_index(key))
}

/// Merge normalized `values` onto `prior`
pub fn merge(prior: Value, values: Map<String, Value>) -> Value {
    if is_sequential(&values) {
        return Value::Array(values.into_iter().map(|(_, v)| naturalize(v)).collect());
    }

    let mut merged = into_keyed(prior);
    replace_recursive(&mut merged, values);
    naturalize(Value::Object(merged))
}

/// Recursive key-preserving replace
///
/// Containers on both sides merge per key at every depth; anything else
/// is replaced by the incoming value.
pub fn replace_recursive(base: &mut Map<String, Value>, values: Map<String, Value>) {
    for (key, incoming) in values {
        let both_containers = is_container(&incoming) && base.get(&key).is_some_and(is_container);

        match base.get_mut(&key) {
            Some(existing) if both_containers => {
                let mut nested = into_keyed(existing.take());
                replace_recursive(&mut nested, into_keyed(incoming));
                *existing = Value::Object(nested);
            }
            _ => {
                base.insert(key, incoming);
            }
        }
    }
}

/// Emit index-keyed mappings as arrays
///
/// A non-empty mapping whose keys are exactly "0".."n-1" in order becomes
/// a JSON array, recursively.
pub fn naturalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let is_list = !map.is_empty()
                && map
                    .keys()
                    .enumerate()
                    .all(|(position, key)| key.parse::<usize>().ok() == Some(position) && is_index(key));

            if is_list {
                Value::Array(map.into_iter().map(|(_, v)| naturalize(v)).collect())
            } else {
                Value::Object(map.into_iter().map(|(k, v)| (k, naturalize(v))).collect())
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(naturalize).collect()),
        scalar => scalar,
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// View a container as a keyed mapping; scalars and null become empty
fn into_keyed(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, v)| (index.to_string(), v))
            .collect(),
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn index_rule() {
        assert!(is_index("0"));
        assert!(is_index("42"));
        assert!(!is_index("007"));
        assert!(!is_index("3.0"));
        assert!(!is_index("-1"));
        assert!(!is_index(""));
        assert!(!is_index("en"));
    }

    #[test]
    fn sparse_indices_compact() {
        let merged = merge(json!(["old"]), object(json!({"2": "foo", "3": "bar"})));
        assert_eq!(merged, json!(["foo", "bar"]));
    }

    #[test]
    fn sequential_keeps_insertion_order() {
        let merged = merge(Value::Null, object(json!({"3": "bar", "2": "foo"})));
        assert_eq!(merged, json!(["bar", "foo"]));
    }

    #[test]
    fn associative_preserves_untouched_siblings() {
        let prior = json!({
            "test1": {"en": "foo", "foo": "test11"},
            "test4": {"es": "asdf", "foo": "test44"}
        });
        let merged = merge(prior, object(json!({"test1": {"en": ""}})));
        assert_eq!(
            merged,
            json!({
                "test1": {"en": "", "foo": "test11"},
                "test4": {"es": "asdf", "foo": "test44"}
            })
        );
    }

    #[test]
    fn associative_onto_empty_prior_is_structural_copy() {
        let values = object(json!({"en": "baz", "nl": 1234}));
        assert_eq!(merge(Value::Null, values), json!({"en": "baz", "nl": 1234}));
    }

    #[test]
    fn scalar_replaces_container_and_back() {
        let prior = json!({"a": {"x": 1}, "b": "plain"});
        let merged = merge(prior, object(json!({"a": "flat", "b": {"y": 2}})));
        assert_eq!(merged, json!({"a": "flat", "b": {"y": 2}}));
    }

    #[test]
    fn nested_lists_merge_by_position() {
        let prior = json!({"tags": ["a", "b", "c"], "k": 1});
        let merged = merge(prior, object(json!({"tags": {"1": "B"}})));
        assert_eq!(merged, json!({"tags": ["a", "B", "c"], "k": 1}));
    }

    #[test]
    fn empty_values_are_sequential() {
        assert_eq!(merge(json!({"a": 1}), Map::new()), json!([]));
    }

    #[test]
    fn naturalize_only_dense_zero_based() {
        assert_eq!(naturalize(json!({"0": "a", "1": {"0": "b"}})), json!(["a", ["b"]]));
        assert_eq!(naturalize(json!({"1": "a"})), json!({"1": "a"}));
        assert_eq!(naturalize(json!({"0": "a", "2": "b"})), json!({"0": "a", "2": "b"}));
        assert_eq!(naturalize(json!({})), json!({}));
    }
}
