//! Recursive merge of JSON trees.
//!
//! Objects merge key by key. Arrays, scalars and nulls are atomic: an overlay
//! value replaces the base value outright and lists are never interleaved.

use serde_json::{Map, Value};

/// Merge `overlay` into `base` in place and return `base`.
///
/// For each key of `overlay`, an object value merges recursively into
/// `base[key]` (an empty object is created first when the slot is absent or
/// not an object); any other value overwrites `base[key]`. A non-object or
/// empty overlay leaves `base` unchanged.
pub fn deep_merge<'a>(base: &'a mut Value, overlay: &Value) -> &'a mut Value {
    if let (Value::Object(base_map), Value::Object(overlay_map)) = (&mut *base, overlay) {
        merge_maps(base_map, overlay_map);
    }
    base
}

/// Map-level merge.
pub(crate) fn merge_maps(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        merge_entry(base, key, value);
    }
}

/// Merge a single overlay entry into `base`.
pub(crate) fn merge_entry(base: &mut Map<String, Value>, key: &str, value: &Value) {
    match value {
        Value::Object(nested) => {
            let slot = base
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(slot_map) = slot {
                merge_maps(slot_map, nested);
            }
        }
        other => {
            base.insert(key.to_string(), other.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn merged(base: Value, overlay: Value) -> Value {
        let mut base = base;
        deep_merge(&mut base, &overlay);
        base
    }

    // -----------------------------------------------------------------------
    // Behaviour
    // -----------------------------------------------------------------------

    #[test]
    fn null_overlay_is_noop() {
        let base = json!({ "a": 1 });
        assert_eq!(merged(base.clone(), Value::Null), base);
    }

    #[test]
    fn empty_overlay_is_noop() {
        let base = json!({ "a": 1, "b": { "c": 2 } });
        assert_eq!(merged(base.clone(), json!({})), base);
    }

    #[test]
    fn scalar_overlay_against_object_is_noop() {
        let base = json!({ "a": 1 });
        assert_eq!(merged(base.clone(), json!(5)), base);
    }

    #[test]
    fn nested_objects_merge_keywise() {
        let out = merged(
            json!({ "homepage": { "tag": "Soulmate", "intro": "hi" } }),
            json!({ "homepage": { "tag": "Partner" } }),
        );
        assert_eq!(out, json!({ "homepage": { "tag": "Partner", "intro": "hi" } }));
    }

    #[test]
    fn arrays_are_replaced_not_interleaved() {
        let out = merged(
            json!({ "notes": [1, 2, 3] }),
            json!({ "notes": [9] }),
        );
        assert_eq!(out, json!({ "notes": [9] }));
    }

    #[test]
    fn empty_array_overrides_defaults() {
        let out = merged(json!({ "notes": [1, 2] }), json!({ "notes": [] }));
        assert_eq!(out, json!({ "notes": [] }));
    }

    #[test]
    fn null_values_overwrite() {
        let out = merged(json!({ "a": { "b": 1 } }), json!({ "a": null }));
        assert_eq!(out, json!({ "a": null }));
    }

    #[test]
    fn missing_container_is_created() {
        let out = merged(json!({}), json!({ "a": { "b": { "c": true } } }));
        assert_eq!(out, json!({ "a": { "b": { "c": true } } }));
    }

    #[test]
    fn scalar_slot_is_replaced_by_container() {
        let out = merged(json!({ "a": "text" }), json!({ "a": { "b": 1 } }));
        assert_eq!(out, json!({ "a": { "b": 1 } }));
    }

    #[test]
    fn new_default_sections_survive_old_records() {
        let defaults = json!({
            "homepage": { "tag": "Soulmate" },
            "surprise": { "title": "Hi", "wheelItems": ["Hug"] }
        });
        let stored = json!({ "homepage": { "tag": "Partner" } });
        let out = merged(defaults, stored);
        assert_eq!(out["surprise"]["wheelItems"], json!(["Hug"]));
        assert_eq!(out["homepage"]["tag"], "Partner");
    }

    #[test]
    fn returns_the_base() {
        let mut base = json!({ "a": 1 });
        let out = deep_merge(&mut base, &json!({ "b": 2 }));
        out["c"] = json!(3);
        assert_eq!(base, json!({ "a": 1, "b": 2, "c": 3 }));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_object() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-d]", arb_json(), 0..5)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(d in arb_object(), p in arb_object()) {
            let once = merged(d, p.clone());
            let twice = merged(once.clone(), p);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn absent_keys_keep_defaults(d in arb_object(), p in arb_object()) {
            let out = merged(d.clone(), p.clone());
            for (key, value) in d.as_object().unwrap() {
                if !p.as_object().unwrap().contains_key(key) {
                    prop_assert_eq!(&out[key], value);
                }
            }
        }

        #[test]
        fn overlay_non_objects_win(d in arb_object(), p in arb_object()) {
            let out = merged(d, p.clone());
            for (key, value) in p.as_object().unwrap() {
                if !value.is_object() {
                    prop_assert_eq!(&out[key], value);
                }
            }
        }
    }
}
