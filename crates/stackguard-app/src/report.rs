use anyhow::Context;
use stackguard_render::{
    RenderableGate, RenderableLocation, RenderableReport, RenderableStack, RenderableVerdict,
};
use stackguard_types::{
    ids, Gate, GateStatus, ReportEnvelope, Severity, StackResult, StackguardData,
    StackguardReportV1, ToolMeta, Verdict, SCHEMA_REPORT_V1,
};
use time::OffsetDateTime;

pub fn parse_report_json(text: &str) -> anyhow::Result<StackguardReportV1> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema:?} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse stackguard report")
}

pub fn serialize_report(report: &StackguardReportV1) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn to_renderable(report: &StackguardReportV1) -> RenderableReport {
    RenderableReport {
        profile: report.data.profile.clone(),
        gate: RenderableGate {
            status: report.gate.status,
            fail_on: report.gate.fail_on,
            reasons: report.gate.reasons.clone(),
        },
        stacks: report.stacks.iter().map(renderable_stack).collect(),
    }
}

fn renderable_stack(stack: &StackResult) -> RenderableStack {
    RenderableStack {
        name: stack.name.clone(),
        status: stack.status,
        error: stack.error.clone(),
        resources_evaluated: stack.summary.resources_evaluated,
        violation_count: stack.summary.violation_count,
        pass_count: stack.summary.pass_count,
        worst_severity: stack.summary.worst_severity,
        verdicts: stack
            .verdicts
            .iter()
            .map(|v| renderable_verdict(stack, v))
            .collect(),
    }
}

fn renderable_verdict(stack: &StackResult, v: &Verdict) -> RenderableVerdict {
    RenderableVerdict {
        resource_id: v.resource_id.clone(),
        resource_kind: v.resource_kind.clone(),
        rule_key: v.rule_key.clone(),
        severity: v.severity,
        outcome: v.outcome,
        message: v.message.clone(),
        location: v.location.as_ref().map(|loc| RenderableLocation {
            path: stack.path.join(&loc.path).to_string(),
            document: loc.document,
        }),
        help: v.help.clone(),
        fingerprint: v.fingerprint.clone(),
    }
}

/// Report written when the run fails before producing one, so CI never sees a missing
/// report as success.
pub fn runtime_error_report(message: &str) -> StackguardReportV1 {
    let now = OffsetDateTime::now_utc();
    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "stackguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at: now,
        finished_at: now,
        gate: Gate {
            status: GateStatus::Error,
            fail_on: Severity::Low,
            reasons: vec![ids::REASON_RUNTIME_ERROR.to_string()],
            error: Some(message.to_string()),
        },
        stacks: Vec::new(),
        data: StackguardData {
            profile: "unknown".to_string(),
            ..StackguardData::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, write_file, INSECURE_BUCKET};
    use stackguard_settings::Overrides;
    use stackguard_types::Outcome;

    #[test]
    fn serialized_report_parses_back() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let root = camino::Utf8Path::from_path(tmp.path()).expect("utf8 path");
        write_file(&root.join("s3-insecure/main.yaml"), INSECURE_BUCKET);

        let report = check(root, "", Overrides::default()).expect("check").report;
        let bytes = serialize_report(&report).expect("serialize");
        let text = String::from_utf8(bytes).expect("utf8");
        assert_eq!(parse_report_json(&text).expect("parse"), report);
    }

    #[test]
    fn foreign_schema_is_rejected() {
        let err = parse_report_json(r#"{"schema": "other.report.v9"}"#).expect_err("schema");
        assert!(format!("{err:#}").contains("other.report.v9"));
        assert!(parse_report_json("not json").is_err());
    }

    #[test]
    fn renderable_locations_are_root_relative() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let root = camino::Utf8Path::from_path(tmp.path()).expect("utf8 path");
        write_file(&root.join("s3-insecure/main.yaml"), INSECURE_BUCKET);

        let report = check(root, "", Overrides::default()).expect("check").report;
        let renderable = to_renderable(&report);
        let first = &renderable.stacks[0].verdicts[0];
        assert_eq!(first.outcome, Outcome::Violation);
        assert_eq!(
            first.location.as_ref().map(|l| l.path.as_str()),
            Some("s3-insecure/main.yaml")
        );
    }

    #[test]
    fn runtime_error_report_carries_the_message() {
        let report = runtime_error_report("boom");
        assert_eq!(report.gate.status, GateStatus::Error);
        assert_eq!(report.gate.error.as_deref(), Some("boom"));
        assert_eq!(report.gate.reasons, vec![ids::REASON_RUNTIME_ERROR.to_string()]);
        assert!(report.stacks.is_empty());
    }
}
