use super::utils::{containers, join_issues, no_containers, CONTAINER_KINDS};
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleResult};
use crate::value::Value;
use stackguard_types::{ids, Severity};

/// Containers must run as non-root and forbid privilege escalation.
///
/// `runAsNonRoot` is inherited from the pod security context when the container
/// leaves it unset; `allowPrivilegeEscalation` must be explicitly `false` on the
/// container.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonRootRequired;

impl Rule for NonRootRequired {
    fn key(&self) -> &str {
        ids::RULE_NON_ROOT_REQUIRED
    }

    fn applies_to(&self) -> &[ResourceKind] {
        CONTAINER_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        let specs = containers(resource)?;
        if specs.is_empty() {
            return Ok(Evaluation::not_applicable(no_containers(resource)));
        }

        let pod_non_root = resource
            .property(props::POD_SECURITY_CONTEXT)
            .and_then(|sc| sc.get("runAsNonRoot"))
            .and_then(Value::as_bool);

        let mut issues = Vec::new();
        for c in &specs {
            let non_root = c
                .security_context("runAsNonRoot")
                .and_then(Value::as_bool)
                .or(pod_non_root)
                .unwrap_or(false);
            if !non_root {
                issues.push(format!("container '{}' does not set runAsNonRoot: true", c.name));
            }

            let escalation = c
                .security_context("allowPrivilegeEscalation")
                .and_then(Value::as_bool);
            if escalation != Some(false) {
                issues.push(format!(
                    "container '{}' does not set allowPrivilegeEscalation: false",
                    c.name
                ));
            }
        }

        if issues.is_empty() {
            Ok(Evaluation::pass("all containers run as non-root without escalation"))
        } else {
            Ok(Evaluation::violation(join_issues(&issues)))
        }
    }
}
