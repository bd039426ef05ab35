use crate::model::stack_status_label;
use crate::RenderableReport;
use stackguard_types::{GateStatus, Outcome};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Stackguard report\n\n");
    let gate = match report.gate.status {
        GateStatus::Pass => "PASS",
        GateStatus::Fail => "FAIL",
        GateStatus::Error => "ERROR",
    };
    out.push_str(&format!(
        "- Gate: **{}** (fail on `{}`, profile `{}`)\n- Stacks: {}\n- Violations: {} / Passes: {}\n\n",
        gate,
        report.gate.fail_on,
        report.profile,
        report.stacks.len(),
        report.violation_total(),
        report.pass_total()
    ));

    if !report.gate.reasons.is_empty() {
        out.push_str(&format!("> Reasons: {}\n\n", report.gate.reasons.join(", ")));
    }

    if report.stacks.is_empty() {
        out.push_str("No stacks evaluated.\n");
        return out;
    }

    for stack in &report.stacks {
        out.push_str(&format!(
            "## `{}` ({})\n\n",
            stack.name,
            stack_status_label(stack.status)
        ));

        if let Some(err) = &stack.error {
            out.push_str(&format!("Error: {}\n\n", err));
            continue;
        }

        let violations: Vec<_> = stack
            .verdicts
            .iter()
            .filter(|v| v.outcome == Outcome::Violation)
            .collect();

        if violations.is_empty() {
            out.push_str("No violations.\n\n");
            continue;
        }

        for v in violations {
            let sev = v.severity.as_str().to_ascii_uppercase();
            match &v.location {
                Some(loc) => out.push_str(&format!(
                    "- [{}] `{}` on `{}`: {} (`{}`#{})\n",
                    sev,
                    v.rule_key,
                    v.resource_id,
                    v.message,
                    loc.path,
                    loc.document.unwrap_or(0)
                )),
                None => out.push_str(&format!(
                    "- [{}] `{}` on `{}`: {}\n",
                    sev, v.rule_key, v.resource_id, v.message
                )),
            }
            if let Some(help) = &v.help {
                out.push_str(&format!("  - help: {}\n", help));
            }
        }
        out.push('\n');
    }

    out
}
