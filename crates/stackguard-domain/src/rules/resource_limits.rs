use super::utils::{containers, join_issues, no_containers, CONTAINER_KINDS};
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleResult};
use crate::value::Value;
use stackguard_types::{ids, Severity};

const REQUIRED_LIMITS: [&str; 2] = ["cpu", "memory"];

#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceLimitsRequired;

impl Rule for ResourceLimitsRequired {
    fn key(&self) -> &str {
        ids::RULE_RESOURCE_LIMITS_REQUIRED
    }

    fn applies_to(&self) -> &[ResourceKind] {
        CONTAINER_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        let specs = containers(resource)?;
        if specs.is_empty() {
            return Ok(Evaluation::not_applicable(no_containers(resource)));
        }

        let mut issues = Vec::new();
        for c in &specs {
            let limits = c.get(props::CONTAINER_LIMITS);
            if limits.is_none_or(Value::is_null) {
                issues.push(format!("container '{}' sets no resource limits", c.name));
                continue;
            }
            let missing: Vec<&str> = REQUIRED_LIMITS
                .iter()
                .copied()
                .filter(|k| limits.and_then(|l| l.get(k)).is_none_or(is_unset))
                .collect();
            if !missing.is_empty() {
                issues.push(format!(
                    "container '{}' limits omit {}",
                    c.name,
                    missing.join(", ")
                ));
            }
        }

        if issues.is_empty() {
            Ok(Evaluation::pass("cpu and memory limits are set"))
        } else {
            Ok(Evaluation::violation(join_issues(&issues)))
        }
    }
}

fn is_unset(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
