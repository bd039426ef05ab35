use super::utils::STORAGE_KINDS;
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleResult};
use stackguard_types::{ids, Severity};

/// Relational rule: a bucket must be covered by a public access block with every flag on.
///
/// A missing block and a partially configured one are the same violation; only the
/// message differs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PublicAccessBlockRequired;

impl Rule for PublicAccessBlockRequired {
    fn key(&self) -> &str {
        ids::RULE_PUBLIC_ACCESS_BLOCK_REQUIRED
    }

    fn applies_to(&self) -> &[ResourceKind] {
        STORAGE_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, resource: &Resource, graph: &ResourceGraph) -> RuleResult {
        let blocks = graph.related(resource, &ResourceKind::PUBLIC_ACCESS_BLOCK);
        if blocks.is_empty() {
            return Ok(Evaluation::violation(format!(
                "bucket '{}' has no public access block attached",
                resource.display_name()
            )));
        }

        let mut partial = Vec::new();
        for block in &blocks {
            let missing = missing_flags(block);
            if missing.is_empty() {
                return Ok(Evaluation::pass(format!(
                    "public access is fully blocked by '{}'",
                    block.id
                )));
            }
            partial.push(format!("'{}' leaves {} unset", block.id, missing.join(", ")));
        }

        Ok(Evaluation::violation(format!(
            "bucket '{}' public access block is incomplete: {}",
            resource.display_name(),
            partial.join("; ")
        )))
    }
}

fn missing_flags(block: &Resource) -> Vec<&'static str> {
    props::PAB_FLAGS
        .iter()
        .copied()
        .filter(|flag| !block.property(flag).is_some_and(|v| v.is_true()))
        .collect()
}
