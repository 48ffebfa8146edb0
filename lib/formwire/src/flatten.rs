//! Nested value flattening.
//!
//! Multipart and urlencoded bodies are flat key/value sequences, so
//! nested scalar values expand into bracketed wire keys before
//! encoding: arrays under `name[i]`, objects under `name[key]`, both in
//! iteration order. The expansion is transient; nothing is persisted.

use serde_json::Value;

/// Expand a field value into an ordered list of flat wire key/value
/// pairs.
///
/// Rules, in priority order:
/// 1. Array: each element flattened under `name[i]`, in index order.
/// 2. String or number: single entry, value stringified.
/// 3. Boolean: single entry, `"true"` / `"false"`.
/// 4. Null: single entry, empty string.
/// 5. Object: each entry flattened under `name[key]`, in the object's
///    iteration order (insertion order, `serde_json` with
///    `preserve_order`).
///
/// An empty array or object contributes no entries.
///
/// # Example
///
/// ```
/// use formwire::flatten;
///
/// let value = serde_json::json!({"a": [1, 2]});
/// let entries = flatten("f", &value);
/// assert_eq!(
///     entries,
///     vec![
///         ("f[a][0]".to_string(), "1".to_string()),
///         ("f[a][1]".to_string(), "2".to_string()),
///     ]
/// );
/// ```
#[must_use]
pub fn flatten(name: &str, value: &Value) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    flatten_into(name, value, &mut entries);
    entries
}

fn flatten_into(key: &str, value: &Value, entries: &mut Vec<(String, String)>) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(&format!("{key}[{index}]"), item, entries);
            }
        }
        Value::Object(map) => {
            for (sub_key, item) in map {
                flatten_into(&format!("{key}[{sub_key}]"), item, entries);
            }
        }
        Value::String(text) => entries.push((key.to_string(), text.clone())),
        Value::Number(number) => entries.push((key.to_string(), number.to_string())),
        Value::Bool(flag) => entries.push((key.to_string(), flag.to_string())),
        Value::Null => entries.push((key.to_string(), String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_string() {
        assert_eq!(
            flatten("name", &json!("Bob")),
            vec![("name".to_string(), "Bob".to_string())]
        );
    }

    #[test]
    fn flatten_number_and_bool() {
        assert_eq!(
            flatten("age", &json!(30)),
            vec![("age".to_string(), "30".to_string())]
        );
        assert_eq!(
            flatten("pi", &json!(3.5)),
            vec![("pi".to_string(), "3.5".to_string())]
        );
        assert_eq!(
            flatten("ok", &json!(true)),
            vec![("ok".to_string(), "true".to_string())]
        );
    }

    #[test]
    fn flatten_null_is_empty_string() {
        assert_eq!(
            flatten("gone", &Value::Null),
            vec![("gone".to_string(), String::new())]
        );
    }

    #[test]
    fn flatten_array_in_index_order() {
        assert_eq!(
            flatten("tags", &json!(["a", "b"])),
            vec![
                ("tags[0]".to_string(), "a".to_string()),
                ("tags[1]".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn flatten_nested_object_in_insertion_order() {
        let value = json!({"b": 1, "a": {"x": [true, null]}});
        assert_eq!(
            flatten("f", &value),
            vec![
                ("f[b]".to_string(), "1".to_string()),
                ("f[a][x][0]".to_string(), "true".to_string()),
                ("f[a][x][1]".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn flatten_empty_containers_contribute_nothing() {
        assert!(flatten("empty", &json!([])).is_empty());
        assert!(flatten("empty", &json!({})).is_empty());
    }
}
