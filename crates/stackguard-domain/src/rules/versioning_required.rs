use super::utils::STORAGE_KINDS;
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::props;
use crate::rule::{Evaluation, Rule, RuleResult};
use stackguard_types::{ids, Severity};

#[derive(Clone, Copy, Debug, Default)]
pub struct VersioningRequired;

impl Rule for VersioningRequired {
    fn key(&self) -> &str {
        ids::RULE_VERSIONING_REQUIRED
    }

    fn applies_to(&self) -> &[ResourceKind] {
        STORAGE_KINDS
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, resource: &Resource, _graph: &ResourceGraph) -> RuleResult {
        let enabled = resource
            .property(props::BUCKET_VERSIONING_ENABLED)
            .is_some_and(|v| v.is_true());

        if enabled {
            Ok(Evaluation::pass("versioning is enabled"))
        } else {
            Ok(Evaluation::violation(format!(
                "bucket '{}' does not enable versioning",
                resource.display_name()
            )))
        }
    }
}
