use crate::model::{Resource, ResourceGraph, ResourceKind};
use crate::value::Value;
use serde_json::json;

/// A resource of `kind` whose top-level properties come from a JSON object.
pub fn resource(id: &str, kind: ResourceKind, props: serde_json::Value) -> Resource {
    let mut r = Resource::new(id, kind);
    if let Value::Map(m) = Value::from(props) {
        r.properties = m;
    }
    r
}

pub fn bucket(id: &str, props: serde_json::Value) -> Resource {
    resource(id, ResourceKind::OBJECT_STORAGE_BUCKET, props)
}

pub fn access_block(id: &str, bucket_id: &str, all_on: bool) -> Resource {
    let mut r = resource(
        id,
        ResourceKind::PUBLIC_ACCESS_BLOCK,
        json!({
            "bucket": bucket_id,
            "blockPublicAcls": true,
            "blockPublicPolicy": true,
            "ignorePublicAcls": all_on,
            "restrictPublicBuckets": true,
        }),
    );
    r.relations.insert(bucket_id.to_string());
    r
}

pub fn deployment(id: &str, props: serde_json::Value) -> Resource {
    resource(id, ResourceKind::WORKLOAD_DEPLOYMENT, props)
}

pub fn graph(resources: Vec<Resource>) -> ResourceGraph {
    ResourceGraph::new(resources).expect("valid graph")
}

pub fn insecure_bucket_props() -> serde_json::Value {
    json!({ "acl": "public-read" })
}

pub fn secure_bucket_props() -> serde_json::Value {
    json!({
        "acl": "private",
        "serverSideEncryption": { "rules": [{ "algorithm": "AES256" }] },
        "versioning": { "enabled": true },
        "logging": { "targets": [{ "targetBucket": "logs-bucket", "targetPrefix": "log/" }] },
    })
}

pub fn insecure_deployment_props() -> serde_json::Value {
    json!({
        "metadata": { "name": "app-insecure", "labels": { "app": "myapp" } },
        "spec": {
            "containers": [{
                "name": "app",
                "image": "myapp:latest",
                "securityContext": { "privileged": true },
            }],
        },
    })
}

pub fn secure_deployment_props() -> serde_json::Value {
    json!({
        "metadata": {
            "name": "nginx-secure",
            "labels": {
                "app.kubernetes.io/name": "nginx",
                "app.kubernetes.io/instance": "nginx-secure",
                "app.kubernetes.io/version": "1.21.0",
                "app.kubernetes.io/component": "webserver",
                "app.kubernetes.io/part-of": "web",
                "app.kubernetes.io/managed-by": "pulumi",
                "environment": "production",
            },
        },
        "spec": {
            "securityContext": { "runAsNonRoot": true, "runAsUser": 1000 },
            "containers": [{
                "name": "nginx",
                "image": "nginx:1.21.0",
                "resources": {
                    "requests": { "cpu": "100m", "memory": "128Mi" },
                    "limits": { "cpu": "500m", "memory": "256Mi" },
                },
                "securityContext": {
                    "runAsNonRoot": true,
                    "runAsUser": 1000,
                    "readOnlyRootFilesystem": true,
                    "allowPrivilegeEscalation": false,
                    "capabilities": { "drop": ["ALL"] },
                },
            }],
        },
    })
}
