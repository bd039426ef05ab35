use super::utils::{containers, join_issues, no_containers, CONTAINER_KINDS};
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::rule::{Evaluation, Rule, RuleResult};
use stackguard_types::{ids, Severity};

#[derive(Clone, Copy, Debug, Default)]
pub struct NoPrivilegedContainers;

impl Rule for NoPrivilegedContainers {
    fn key(&self) -> &str {
        ids::RULE_NO_PRIVILEGED_CONTAINERS
    }

    fn applies_to(&self) -> &[ResourceKind] {
        CONTAINER_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        let specs = containers(resource)?;
        if specs.is_empty() {
            return Ok(Evaluation::not_applicable(no_containers(resource)));
        }

        let issues: Vec<String> = specs
            .iter()
            .filter(|c| c.security_context("privileged").is_some_and(|v| v.is_true()))
            .map(|c| format!("container '{}' runs privileged", c.name))
            .collect();

        if issues.is_empty() {
            Ok(Evaluation::pass("no container runs privileged"))
        } else {
            Ok(Evaluation::violation(join_issues(&issues)))
        }
    }
}
