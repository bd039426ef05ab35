use crate::model::{gate_label, stack_status_label};
use crate::RenderableReport;

/// Line-oriented report: a header per stack, one line per verdict, and a closing summary line.
///
/// Verdict lines read `{resource_id} {rule_key} {severity} {outcome}: {message}`.
/// Line breaks inside messages and stack errors are written as a literal `\n`.
pub fn render_text(report: &RenderableReport) -> String {
    let mut out = String::new();

    for stack in &report.stacks {
        out.push_str(&format!(
            "stack {}: {}\n",
            stack.name,
            stack_status_label(stack.status)
        ));
        if let Some(err) = &stack.error {
            out.push_str(&format!("  error: {}\n", one_line(err)));
        }
        for v in &stack.verdicts {
            out.push_str(&format!(
                "  {} {} {} {}: {}\n",
                v.resource_id,
                v.rule_key,
                v.severity,
                v.outcome,
                one_line(&v.message)
            ));
        }
    }

    out.push_str(&format!(
        "summary: stacks={} resources={} violations={} passes={} worst={} gate={} fail_on={}\n",
        report.stacks.len(),
        report.resource_total(),
        report.violation_total(),
        report.pass_total(),
        report.worst_severity().map(|s| s.as_str()).unwrap_or("none"),
        gate_label(report.gate.status),
        report.gate.fail_on,
    ));

    out
}

fn one_line(s: &str) -> String {
    s.replace("\r\n", "\\n").replace(['\n', '\r'], "\\n")
}
