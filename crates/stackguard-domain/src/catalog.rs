use crate::model::ResourceKind;
use crate::rule::Rule;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate rule key: {0}")]
    DuplicateRuleKey(String),

    #[error("invalid allow pattern for {rule}: {pattern}")]
    InvalidAllowPattern {
        rule: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// An explicit, constructed set of rules keyed by rule key.
///
/// Read-only once built; cloning shares the rule bodies.
#[derive(Clone, Default)]
pub struct RuleCatalog {
    rules: BTreeMap<String, Arc<dyn Rule>>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> Result<(), CatalogError> {
        self.register_shared(Arc::new(rule))
    }

    pub fn register_shared(&mut self, rule: Arc<dyn Rule>) -> Result<(), CatalogError> {
        let key = rule.key().to_string();
        if self.rules.contains_key(&key) {
            return Err(CatalogError::DuplicateRuleKey(key));
        }
        self.rules.insert(key, rule);
        Ok(())
    }

    /// Rules applicable to `kind`, highest severity first, then by key.
    pub fn rules_for(&self, kind: &ResourceKind) -> Vec<&dyn Rule> {
        let mut out: Vec<&dyn Rule> = self
            .rules
            .values()
            .filter(|r| r.applies_to().contains(kind))
            .map(|r| r.as_ref())
            .collect();
        // Iteration is already key-ordered; a stable sort keeps that within a severity.
        out.sort_by(|a, b| b.severity().cmp(&a.severity()));
        out
    }

    pub fn get(&self, key: &str) -> Option<&dyn Rule> {
        self.rules.get(key).map(|r| r.as_ref())
    }

    /// All rules in key order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.values().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleCatalog")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}
