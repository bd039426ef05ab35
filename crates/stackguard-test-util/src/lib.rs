//! Shared test utilities for the stackguard workspace.
//!
//! `xtask` needs `normalize_nondeterministic` at runtime, so this cannot live behind
//! `#[cfg(test)]` in `stackguard-types`.

use serde_json::Value;

/// Placeholders substituted by [`normalize_nondeterministic`].
pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";
pub const VERSION_PLACEHOLDER: &str = "__VERSION__";

/// Normalize non-deterministic report fields for golden comparison.
///
/// - `tool.version` is replaced only on the root object, and only when the root looks like a
///   report envelope (`schema`, `tool`, `gate`, `stacks`).
/// - `started_at` / `finished_at` are replaced at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "gate", "stacks"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_envelope
            && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool.contains_key("version")
        {
            tool.insert(
                "version".to_string(),
                Value::String(VERSION_PLACEHOLDER.to_string()),
            );
        }
    }
    normalize_timestamps(&mut value);
    value
}

fn normalize_timestamps(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "finished_at"] {
                if let Some(v) = map.get_mut(key) {
                    *v = Value::String(TIMESTAMP_PLACEHOLDER.to_string());
                }
            }
            for v in map.values_mut() {
                normalize_timestamps(v);
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(normalize_timestamps),
        _ => {}
    }
}
