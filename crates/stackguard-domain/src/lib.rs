//! Pure policy evaluation (no IO).
//!
//! Input: a resource graph constructed elsewhere and an explicit rule catalog.
//! Output: an immutable report of per-resource, per-rule verdicts.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod fingerprint;
pub mod model;
pub mod policy;
pub mod props;
pub mod report;
pub mod rule;
pub mod rules;
pub mod value;

mod engine;

pub use catalog::{CatalogError, RuleCatalog};
pub use engine::{CancelToken, EvalOptions, EvaluationError, evaluate, evaluate_with};
pub use model::{GraphError, Resource, ResourceGraph, ResourceKind};
pub use report::Report;
pub use rule::{Evaluation, Rule, RuleEvaluationError, RuleResult};
pub use value::Value;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod proptest;
