//! Built-in rule set.
//!
//! Each rule lives in its own module and is a plain value implementing [`Rule`].
//! [`builtin_catalog`] assembles them under an [`EffectivePolicy`]: disabled rules are
//! left out, and severity overrides and allowlists are applied by wrapping.

use crate::catalog::{CatalogError, RuleCatalog};
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::policy::EffectivePolicy;
use crate::rule::{Evaluation, Rule, RuleResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use stackguard_types::Severity;
use std::sync::Arc;

mod access_logging;
mod encryption_required;
mod no_mutable_image_tag;
mod no_privileged_containers;
mod no_public_acl;
mod non_root;
mod public_access_block;
mod required_labels;
mod resource_limits;
mod utils;
mod versioning_required;


pub use access_logging::AccessLoggingRecommended;
pub use encryption_required::EncryptionRequired;
pub use no_mutable_image_tag::NoMutableImageTag;
pub use no_privileged_containers::NoPrivilegedContainers;
pub use no_public_acl::NoPublicAcl;
pub use non_root::NonRootRequired;
pub use public_access_block::PublicAccessBlockRequired;
pub use required_labels::RequiredLabels;
pub use resource_limits::ResourceLimitsRequired;
pub use versioning_required::VersioningRequired;

/// Every built-in rule with its default configuration.
pub fn builtin_rules(policy: &EffectivePolicy) -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(NoPublicAcl),
        Arc::new(EncryptionRequired),
        Arc::new(VersioningRequired),
        Arc::new(AccessLoggingRecommended),
        Arc::new(PublicAccessBlockRequired),
        Arc::new(RequiredLabels::new(policy.required_labels.clone())),
        Arc::new(NoMutableImageTag),
        Arc::new(NoPrivilegedContainers),
        Arc::new(ResourceLimitsRequired),
        Arc::new(NonRootRequired),
    ]
}

/// Build the catalog of built-in rules configured by `policy`.
pub fn builtin_catalog(policy: &EffectivePolicy) -> Result<RuleCatalog, CatalogError> {
    let mut catalog = RuleCatalog::new();
    for rule in builtin_rules(policy) {
        if !policy.rule_enabled(rule.key()) {
            continue;
        }
        match policy.rule_policy(rule.key()) {
            Some(p) if p.severity.is_some() || !p.allow.is_empty() => {
                let allow = build_allowlist(rule.key(), &p.allow)?;
                let severity = p.severity.unwrap_or_else(|| rule.severity());
                catalog.register(Configured {
                    inner: rule,
                    severity,
                    allow,
                })?;
            }
            _ => catalog.register_shared(rule)?,
        }
    }
    Ok(catalog)
}

fn build_allowlist(rule: &str, allow: &[String]) -> Result<Option<GlobSet>, CatalogError> {
    if allow.is_empty() {
        return Ok(None);
    }

    let invalid = |pattern: &str, source| CatalogError::InvalidAllowPattern {
        rule: rule.to_string(),
        pattern: pattern.to_string(),
        source,
    };

    let mut builder = GlobSetBuilder::new();
    for pattern in allow {
        builder.add(Glob::new(pattern).map_err(|e| invalid(pattern, e))?);
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| invalid(&allow.join(","), e))
}

/// A rule with policy applied: severity override and resource id allowlist.
struct Configured {
    inner: Arc<dyn Rule>,
    severity: Severity,
    allow: Option<GlobSet>,
}

impl Rule for Configured {
    fn key(&self) -> &str {
        self.inner.key()
    }

    fn applies_to(&self) -> &[ResourceKind] {
        self.inner.applies_to()
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, resource: &Resource, graph: &ResourceGraph) -> RuleResult {
        if self.allow.as_ref().is_some_and(|set| set.is_match(&resource.id)) {
            return Ok(Evaluation::not_applicable(format!(
                "resource '{}' is exempted from {} by policy allowlist",
                resource.id,
                self.inner.key()
            )));
        }
        self.inner.evaluate(resource, graph)
    }
}
