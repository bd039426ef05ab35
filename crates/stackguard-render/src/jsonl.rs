use crate::RenderableReport;
use serde_json::{Map, Value, json};

/// One JSON object per verdict, newline-terminated, in report order.
///
/// Malformed stacks contribute a single `{"stack", "error"}` record.
pub fn render_jsonl(report: &RenderableReport) -> String {
    let mut out = String::new();

    for stack in &report.stacks {
        if let Some(err) = &stack.error {
            push_line(&mut out, json!({ "stack": stack.name, "error": err }));
            continue;
        }
        for v in &stack.verdicts {
            let mut obj = Map::new();
            obj.insert("stack".into(), json!(stack.name));
            obj.insert("resource_id".into(), json!(v.resource_id));
            obj.insert("resource_kind".into(), json!(v.resource_kind));
            obj.insert("rule_key".into(), json!(v.rule_key));
            obj.insert("severity".into(), json!(v.severity.as_str()));
            obj.insert("outcome".into(), json!(v.outcome.as_str()));
            obj.insert("message".into(), json!(v.message));
            if let Some(loc) = &v.location {
                obj.insert(
                    "location".into(),
                    json!({ "path": loc.path, "document": loc.document }),
                );
            }
            if let Some(help) = &v.help {
                obj.insert("help".into(), json!(help));
            }
            if let Some(fp) = &v.fingerprint {
                obj.insert("fingerprint".into(), json!(fp));
            }
            push_line(&mut out, Value::Object(obj));
        }
    }

    out
}

fn push_line(out: &mut String, value: Value) {
    out.push_str(&value.to_string());
    out.push('\n');
}
