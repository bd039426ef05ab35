use crate::catalog::RuleCatalog;
use crate::fingerprint::fingerprint_for_verdict;
use crate::model::{Resource, ResourceGraph};
use crate::report::Report;
use crate::rule::{Evaluation, Rule};
use rayon::prelude::*;
use stackguard_types::explain::remediation_hint;
use stackguard_types::Verdict;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the caller and a running evaluation.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, Default)]
pub struct EvalOptions {
    /// Size of a dedicated worker pool. `None` runs on the global rayon pool.
    pub workers: Option<usize>,
    pub cancel: Option<CancelToken>,
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("evaluation cancelled")]
    Cancelled,

    #[error("failed to build evaluation worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Evaluate every resource of `graph` against the applicable rules of `catalog`.
///
/// Runs on the global pool and cannot be cancelled, so it cannot fail.
pub fn evaluate(graph: &ResourceGraph, catalog: &RuleCatalog) -> Report {
    freeze(graph, evaluate_all(graph, catalog, None))
}

/// [`evaluate`] with an explicit pool size and cancellation.
///
/// On cancellation the verdicts gathered so far are dropped; no partial report is
/// returned.
pub fn evaluate_with(
    graph: &ResourceGraph,
    catalog: &RuleCatalog,
    opts: &EvalOptions,
) -> Result<Report, EvaluationError> {
    let cancel = opts.cancel.as_ref();
    let per_resource = match opts.workers {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            pool.install(|| evaluate_all(graph, catalog, cancel))
        }
        None => evaluate_all(graph, catalog, cancel),
    };

    // The flag never resets, so an uncancelled run skipped no resource.
    if cancel.is_some_and(CancelToken::is_cancelled) {
        tracing::info!(resources = graph.len(), "evaluation cancelled");
        return Err(EvaluationError::Cancelled);
    }
    Ok(freeze(graph, per_resource))
}

/// Per-resource verdict lists in declared resource order, each in catalog order.
/// `None` marks a resource skipped because of cancellation.
fn evaluate_all(
    graph: &ResourceGraph,
    catalog: &RuleCatalog,
    cancel: Option<&CancelToken>,
) -> Vec<Option<Vec<Verdict>>> {
    graph
        .resources()
        .par_iter()
        .map(|resource| {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return None;
            }
            let rules = catalog.rules_for(&resource.kind);
            tracing::debug!(
                resource = %resource.id,
                kind = %resource.kind,
                rules = rules.len(),
                "evaluating resource"
            );
            Some(
                rules
                    .into_iter()
                    .map(|rule| verdict_for(rule, resource, graph))
                    .collect(),
            )
        })
        .collect()
}

fn freeze(graph: &ResourceGraph, per_resource: Vec<Option<Vec<Verdict>>>) -> Report {
    let verdicts: Vec<Verdict> = per_resource.into_iter().flatten().flatten().collect();
    let report = Report::from_verdicts(verdicts, graph.len());
    let summary = report.summary();
    tracing::info!(
        resources = summary.resources_evaluated,
        verdicts = summary.verdicts_total,
        violations = summary.violation_count,
        worst = ?summary.worst_severity,
        "evaluation finished"
    );
    report
}

fn verdict_for(rule: &dyn Rule, resource: &Resource, graph: &ResourceGraph) -> Verdict {
    let evaluation = run_rule(rule, resource, graph);
    let is_violation = evaluation.outcome == stackguard_types::Outcome::Violation;
    let kind = resource.kind.as_str();

    Verdict {
        resource_id: resource.id.clone(),
        resource_kind: kind.to_string(),
        rule_key: rule.key().to_string(),
        severity: rule.severity(),
        outcome: evaluation.outcome,
        message: evaluation.message,
        location: resource.location.clone(),
        help: is_violation
            .then(|| remediation_hint(rule.key()).map(str::to_string))
            .flatten(),
        fingerprint: is_violation.then(|| fingerprint_for_verdict(rule.key(), kind, &resource.id)),
    }
}

/// Run one rule, converting an error or a panic into a violation.
fn run_rule(rule: &dyn Rule, resource: &Resource, graph: &ResourceGraph) -> Evaluation {
    let result = catch_unwind(AssertUnwindSafe(|| rule.evaluate(resource, graph)));
    let fault = match result {
        Ok(Ok(evaluation)) => return evaluation,
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };

    tracing::warn!(
        rule = rule.key(),
        resource = %resource.id,
        error = %fault,
        "rule evaluation failed; recording violation"
    );
    Evaluation::violation(format!("rule evaluation error: {fault}"))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}
