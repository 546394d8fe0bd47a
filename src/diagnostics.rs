//! Run-time diagnostics: the progress callback threaded through the pipeline
//! and the pure dotted-path transform backing the verbose filter dump.

use std::sync::Arc;

/// Inline diagnostic sink. The binary wires this to stderr; library code
/// never prints directly.
pub type ProgressFn = Arc<dyn Fn(&str) + Send + Sync>;

pub(crate) fn report(progress: &Option<ProgressFn>, message: &str) {
    if let Some(callback) = progress {
        callback(message);
    }
}

/// Flatten a JSON tree into `(dotted.path, scalar value)` pairs, depth-first
/// in key order. Diagnostics only; never used for control flow.
pub fn flatten_paths(value: &serde_json::Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &serde_json::Value, prefix: String, out: &mut Vec<(String, String)>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, join(&prefix, key), out);
            }
        }
        serde_json::Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, join(&prefix, &index.to_string()), out);
            }
        }
        serde_json::Value::Null => out.push((prefix, "null".to_string())),
        serde_json::Value::String(s) => out.push((prefix, s.clone())),
        other => out.push((prefix, other.to_string())),
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_objects_and_arrays() {
        let value = json!({
            "query": "denim",
            "price": { "min": 50, "max": 200 },
            "designers": ["nike", "stone island"],
        });

        let paths = flatten_paths(&value);
        assert_eq!(
            paths,
            vec![
                ("designers.0".to_string(), "nike".to_string()),
                ("designers.1".to_string(), "stone island".to_string()),
                ("price.max".to_string(), "200".to_string()),
                ("price.min".to_string(), "50".to_string()),
                ("query".to_string(), "denim".to_string()),
            ]
        );
    }

    #[test]
    fn empty_object_flattens_to_nothing() {
        assert!(flatten_paths(&json!({})).is_empty());
    }

    #[test]
    fn scalar_root_keeps_empty_path() {
        let paths = flatten_paths(&json!(42));
        assert_eq!(paths, vec![(String::new(), "42".to_string())]);
    }
}
