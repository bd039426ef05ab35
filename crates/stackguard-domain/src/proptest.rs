//! Property-based tests for the evaluator.
//!
//! These tests use proptest to verify invariants around:
//! - Determinism of reports across runs and pool sizes
//! - Rules only ever seeing the kinds they declare
//! - Graph and catalog staying untouched by evaluation
//! - Summary counts agreeing with the verdict list

use crate::engine::{evaluate, evaluate_with, EvalOptions};
use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::policy::EffectivePolicy;
use crate::rules::builtin_catalog;
use crate::test_support::resource;
use proptest::prelude::*;
use serde_json::json;
use stackguard_types::Outcome;

// ============================================================================
// Strategies
// ============================================================================

fn arb_acl() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(json!("private")),
        Just(json!("public-read")),
        Just(json!("public-read-write")),
        Just(json!("authenticated-read")),
        Just(serde_json::Value::Null),
        // Wrong shape; must surface as an isolated rule error.
        Just(json!(42)),
    ]
}

fn arb_bucket_props() -> impl Strategy<Value = serde_json::Value> {
    (arb_acl(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(acl, encrypted, versioned, logged)| {
            let mut props = json!({ "acl": acl });
            if encrypted {
                props["serverSideEncryption"] = json!({ "rules": [{ "algorithm": "aws:kms" }] });
            }
            props["versioning"] = json!({ "enabled": versioned });
            if logged {
                props["logging"] = json!({ "targets": [{ "targetBucket": "logs" }] });
            }
            props
        },
    )
}

fn arb_image() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("nginx".to_string()),
        Just("nginx:latest".to_string()),
        Just("registry:5000/app".to_string()),
        "[a-z]{1,8}:[0-9]\\.[0-9]{1,2}".prop_map(|s| s),
        "[a-z]{1,8}@sha256:[0-9a-f]{8}".prop_map(|s| s),
    ]
}

fn arb_container() -> impl Strategy<Value = serde_json::Value> {
    (
        arb_image(),
        any::<bool>(),
        proptest::option::of(any::<bool>()),
        any::<bool>(),
    )
        .prop_map(|(image, privileged, non_root, limits)| {
            let mut c = json!({
                "name": "c",
                "image": image,
                "securityContext": { "privileged": privileged },
            });
            if let Some(flag) = non_root {
                c["securityContext"]["runAsNonRoot"] = json!(flag);
            }
            if limits {
                c["resources"] = json!({ "limits": { "cpu": "1", "memory": "1Gi" } });
            }
            c
        })
}

fn arb_deployment_props() -> impl Strategy<Value = serde_json::Value> {
    (prop::collection::vec(arb_container(), 0..3), any::<bool>()).prop_map(
        |(containers, labelled)| {
            let labels = if labelled {
                json!({ "app.kubernetes.io/name": "x" })
            } else {
                json!({})
            };
            json!({ "metadata": { "labels": labels }, "spec": { "containers": containers } })
        },
    )
}

#[derive(Clone, Debug)]
enum Shape {
    Bucket(serde_json::Value),
    Deployment(serde_json::Value),
    Other,
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        arb_bucket_props().prop_map(Shape::Bucket),
        arb_deployment_props().prop_map(Shape::Deployment),
        Just(Shape::Other),
    ]
}

fn arb_graph() -> impl Strategy<Value = ResourceGraph> {
    prop::collection::vec(arb_shape(), 0..12).prop_map(|shapes| {
        let resources: Vec<Resource> = shapes
            .into_iter()
            .enumerate()
            .map(|(i, shape)| {
                let id = format!("r{i}");
                match shape {
                    Shape::Bucket(p) => resource(&id, ResourceKind::OBJECT_STORAGE_BUCKET, p),
                    Shape::Deployment(p) => resource(&id, ResourceKind::WORKLOAD_DEPLOYMENT, p),
                    Shape::Other => Resource::new(id, ResourceKind::custom("Queue")),
                }
            })
            .collect();
        ResourceGraph::new(resources).expect("ids are unique")
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn evaluation_is_deterministic(g in arb_graph()) {
        let catalog = builtin_catalog(&EffectivePolicy::default()).expect("catalog");
        let first = evaluate(&g, &catalog);
        let second = evaluate(&g, &catalog);
        prop_assert_eq!(&first, &second);

        let a = serde_json::to_string(first.verdicts()).expect("serialize");
        let b = serde_json::to_string(second.verdicts()).expect("serialize");
        prop_assert_eq!(a, b);
    }

    #[test]
    fn pool_size_does_not_change_the_report(g in arb_graph(), workers in 1usize..4) {
        let catalog = builtin_catalog(&EffectivePolicy::default()).expect("catalog");
        let opts = EvalOptions { workers: Some(workers), cancel: None };
        let pooled = evaluate_with(&g, &catalog, &opts).expect("evaluate");
        prop_assert_eq!(pooled, evaluate(&g, &catalog));
    }

    #[test]
    fn rules_only_see_declared_kinds(g in arb_graph()) {
        let catalog = builtin_catalog(&EffectivePolicy::default()).expect("catalog");
        let report = evaluate(&g, &catalog);

        let expected: usize = g.resources().iter().map(|r| catalog.rules_for(&r.kind).len()).sum();
        prop_assert_eq!(report.verdicts().len(), expected);

        for v in report.verdicts() {
            let rule = catalog.get(&v.rule_key).expect("rule in catalog");
            prop_assert!(rule.applies_to().iter().any(|k| k.as_str() == v.resource_kind));
            prop_assert_ne!(v.resource_kind.as_str(), "Queue");
        }
    }

    #[test]
    fn evaluation_leaves_inputs_untouched(g in arb_graph()) {
        let catalog = builtin_catalog(&EffectivePolicy::default()).expect("catalog");
        let before = g.clone();
        let keys_before: Vec<String> = catalog.iter().map(|r| r.key().to_string()).collect();

        let _ = evaluate(&g, &catalog);

        prop_assert_eq!(&g, &before);
        let keys_after: Vec<String> = catalog.iter().map(|r| r.key().to_string()).collect();
        prop_assert_eq!(keys_before, keys_after);
    }

    #[test]
    fn summary_agrees_with_verdicts(g in arb_graph()) {
        let catalog = builtin_catalog(&EffectivePolicy::default()).expect("catalog");
        let report = evaluate(&g, &catalog);
        let s = report.summary();

        let violations = report.verdicts().iter().filter(|v| v.outcome == Outcome::Violation).count();
        prop_assert_eq!(s.violation_count as usize, violations);
        prop_assert_eq!(
            (s.pass_count + s.violation_count + s.not_applicable_count) as usize,
            report.verdicts().len()
        );
        prop_assert_eq!(report.is_compliant(), violations == 0);
        prop_assert_eq!(
            s.worst_severity,
            report.violations().map(|v| v.severity).max()
        );
        prop_assert_eq!(s.resources_evaluated as usize, g.len());
    }

    #[test]
    fn verdicts_keep_declared_resource_order(g in arb_graph()) {
        let catalog = builtin_catalog(&EffectivePolicy::default()).expect("catalog");
        let report = evaluate(&g, &catalog);

        let position = |id: &str| g.resources().iter().position(|r| r.id == id);
        let positions: Vec<_> = report.verdicts().iter().map(|v| position(&v.resource_id)).collect();
        prop_assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    }
}
