//! Shared test utilities for the sosguard workspace.

use serde_json::Value;
use std::path::PathBuf;

/// Repo-level `tests/fixtures` directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
}

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// 1. **Root-only**: when the root looks like a report envelope (`schema`,
///    `tool`, `verdict`, `findings`, `data`), `tool.version` becomes
///    `"__VERSION__"` and `data.bundle` becomes `"__BUNDLE__"`.
/// 2. **Recursive**: `started_at` and `finished_at` become `"__TIMESTAMP__"`
///    at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "verdict", "findings", "data"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_envelope {
            if let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
                && tool.contains_key("version")
            {
                tool.insert("version".to_string(), Value::from("__VERSION__"));
            }
            if let Some(data) = obj.get_mut("data").and_then(Value::as_object_mut)
                && data.contains_key("bundle")
            {
                data.insert("bundle".to_string(), Value::from("__BUNDLE__"));
            }
        }
    }
    normalize_timestamps_recursive(&mut value);
    value
}

fn normalize_timestamps_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "finished_at"] {
                if map.contains_key(key) {
                    map.insert(key.to_string(), Value::from("__TIMESTAMP__"));
                }
            }
            for val in map.values_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_fields_are_normalized() {
        let report = json!({
            "schema": "sosguard.report.v1",
            "tool": {"name": "sosguard", "version": "9.9.9"},
            "started_at": "2026-01-01T00:00:00Z",
            "finished_at": "2026-01-01T00:00:01Z",
            "verdict": "pass",
            "findings": [],
            "data": {"bundle": "/tmp/xyz", "profile": "strict"}
        });
        let n = normalize_nondeterministic(report);
        assert_eq!(n["tool"]["version"], "__VERSION__");
        assert_eq!(n["data"]["bundle"], "__BUNDLE__");
        assert_eq!(n["data"]["profile"], "strict");
        assert_eq!(n["started_at"], "__TIMESTAMP__");
        assert_eq!(n["finished_at"], "__TIMESTAMP__");
    }

    #[test]
    fn nested_lookalikes_keep_their_version() {
        let value = json!({
            "tool": {"version": "1"},
            "findings": [{"data": {"started_at": "x"}}]
        });
        let n = normalize_nondeterministic(value);
        assert_eq!(n["tool"]["version"], "1");
        assert_eq!(n["findings"][0]["data"]["started_at"], "__TIMESTAMP__");
    }

    #[test]
    fn fixtures_dir_points_at_repo_tests() {
        assert!(fixtures_dir().ends_with("tests/fixtures"));
    }
}
