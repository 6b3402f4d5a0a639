//! Key case conversion between the wire format and the in-memory model
//!
//! The backend speaks snake_case JSON. Opaque parts of a response (result
//! hits, extra metadata) are kept with camelCase keys, and caller supplied
//! request fields are turned back into snake_case before they are sent.

use heck::{ToLowerCamelCase, ToSnakeCase};
use serde_json::{Map, Value};

/// Convert a single snake_case key to camelCase
pub fn snake_to_camel(key: &str) -> String {
    key.to_lower_camel_case()
}

/// Convert a single camelCase key to snake_case
pub fn camel_to_snake(key: &str) -> String {
    key.to_snake_case()
}

/// Rename all object keys to camelCase, recursing into objects and arrays
pub fn keys_to_camel(value: Value) -> Value {
    rename_keys(value, &snake_to_camel)
}

/// Rename all object keys to snake_case, recursing into objects and arrays
pub fn keys_to_snake(value: Value) -> Value {
    rename_keys(value, &camel_to_snake)
}

fn rename_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (rename(&k), rename_keys(v, rename)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| rename_keys(v, rename)).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_keys() {
        assert_eq!(snake_to_camel("results_from"), "resultsFrom");
        assert_eq!(snake_to_camel("query"), "query");
        assert_eq!(camel_to_snake("pageSize"), "page_size");
        assert_eq!(camel_to_snake("_extendedMeta"), "extended_meta");
    }

    #[test]
    fn test_nested_objects() {
        let wire = json!({
            "results_from": 10,
            "indices": [{"index_id": "cw12", "display_name": "ClueWeb12"}],
            "explain": {"total_hits": 3}
        });

        let camel = keys_to_camel(wire.clone());
        assert_eq!(
            camel,
            json!({
                "resultsFrom": 10,
                "indices": [{"indexId": "cw12", "displayName": "ClueWeb12"}],
                "explain": {"totalHits": 3}
            })
        );
        assert_eq!(keys_to_snake(camel), wire);
    }

    #[test]
    fn test_values_untouched() {
        let value = json!({"target_uri": "http://a.b/some_path", "tags": ["snake_case"]});
        let camel = keys_to_camel(value);
        assert_eq!(camel["targetUri"], "http://a.b/some_path");
        assert_eq!(camel["tags"][0], "snake_case");
    }
}
