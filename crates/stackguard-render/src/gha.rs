use crate::RenderableReport;

/// Render violations as GitHub Actions workflow command annotations.
///
/// Violations at or above the gate threshold become `error`, lower ones `warning`.
///
/// Format:
/// `::{level} file={path}::[{rule_key}] {resource_id}: {message}`
pub fn render_github_annotations(report: &RenderableReport) -> Vec<String> {
    let mut out = Vec::new();

    for (_, v) in report.violations() {
        let level = if v.severity >= report.gate.fail_on {
            "error"
        } else {
            "warning"
        };

        let message = escape_data(&format!("[{}] {}: {}", v.rule_key, v.resource_id, v.message));

        match &v.location {
            Some(loc) => out.push(format!(
                "::{} file={}::{}",
                level,
                escape_property(&loc.path),
                message
            )),
            None => out.push(format!("::{}::{}", level, message)),
        }
    }

    out
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
