//! Explain registry for rules.
//!
//! Maps rule keys to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a rule.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the rule.
    pub title: &'static str,
    /// One-line remediation hint attached to violation verdicts.
    pub hint: &'static str,
    /// What the rule does and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
    /// Before/after resource declarations.
    pub examples: ExamplePair,
}

/// Before and after resource declarations.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Declaration that would produce a violation.
    pub before: &'static str,
    /// Declaration that passes the rule.
    pub after: &'static str,
}

/// Look up an explanation by rule key.
///
/// Returns `None` if the key is not recognized.
pub fn lookup_explanation(rule_key: &str) -> Option<Explanation> {
    match rule_key {
        ids::RULE_NO_PUBLIC_ACL => Some(explain_no_public_acl()),
        ids::RULE_ENCRYPTION_REQUIRED => Some(explain_encryption_required()),
        ids::RULE_VERSIONING_REQUIRED => Some(explain_versioning_required()),
        ids::RULE_ACCESS_LOGGING_RECOMMENDED => Some(explain_access_logging()),
        ids::RULE_PUBLIC_ACCESS_BLOCK_REQUIRED => Some(explain_public_access_block()),
        ids::RULE_REQUIRED_LABELS => Some(explain_required_labels()),
        ids::RULE_NO_MUTABLE_IMAGE_TAG => Some(explain_no_mutable_image_tag()),
        ids::RULE_NO_PRIVILEGED_CONTAINERS => Some(explain_no_privileged()),
        ids::RULE_RESOURCE_LIMITS_REQUIRED => Some(explain_resource_limits()),
        ids::RULE_NON_ROOT_REQUIRED => Some(explain_non_root()),
        _ => None,
    }
}

/// Short remediation hint for a rule key, if one is registered.
pub fn remediation_hint(rule_key: &str) -> Option<&'static str> {
    lookup_explanation(rule_key).map(|e| e.hint)
}

/// List all known rule keys.
pub fn all_rule_keys() -> &'static [&'static str] {
    &[
        ids::RULE_NO_PUBLIC_ACL,
        ids::RULE_ENCRYPTION_REQUIRED,
        ids::RULE_VERSIONING_REQUIRED,
        ids::RULE_ACCESS_LOGGING_RECOMMENDED,
        ids::RULE_PUBLIC_ACCESS_BLOCK_REQUIRED,
        ids::RULE_REQUIRED_LABELS,
        ids::RULE_NO_MUTABLE_IMAGE_TAG,
        ids::RULE_NO_PRIVILEGED_CONTAINERS,
        ids::RULE_RESOURCE_LIMITS_REQUIRED,
        ids::RULE_NON_ROOT_REQUIRED,
    ]
}

// --- Object storage ---

fn explain_no_public_acl() -> Explanation {
    Explanation {
        title: "No Public Bucket ACL",
        hint: "Set the bucket ACL to `private` and grant access through scoped policies.",
        description: "\
Detects object storage buckets whose canned ACL grants access to everyone.

The `public-read` and `public-read-write` ACLs expose every object in the bucket
to anonymous callers. `public-read-write` additionally lets anyone upload or
overwrite objects, which turns the bucket into free hosting for attackers.",
        remediation: "\
Use the `private` ACL (the default) and grant access explicitly:
- Use bucket policies scoped to specific principals
- Serve public content through a CDN with origin access control
- Pair the bucket with a public access block that ignores public ACLs",
        examples: ExamplePair {
            before: r#"type: aws:s3/bucket:Bucket
name: assets
properties:
  acl: public-read"#,
            after: r#"type: aws:s3/bucket:Bucket
name: assets
properties:
  acl: private"#,
        },
    }
}

fn explain_encryption_required() -> Explanation {
    Explanation {
        title: "Server-Side Encryption Required",
        hint: "Add a server-side encryption rule with a default algorithm (AES256 or aws:kms).",
        description: "\
Detects buckets without a server-side encryption-by-default rule.

Without default encryption, objects written by clients that do not request
encryption are stored in plaintext. A rule only counts when it names a
non-empty algorithm.",
        remediation: "\
Declare `serverSideEncryptionConfiguration` with at least one rule whose
`applyServerSideEncryptionByDefault.sseAlgorithm` is `AES256` or `aws:kms`.",
        examples: ExamplePair {
            before: r#"properties:
  acl: private"#,
            after: r#"properties:
  serverSideEncryptionConfiguration:
    rule:
      applyServerSideEncryptionByDefault:
        sseAlgorithm: AES256"#,
        },
    }
}

fn explain_versioning_required() -> Explanation {
    Explanation {
        title: "Bucket Versioning Required",
        hint: "Enable bucket versioning (`versioning.enabled: true`).",
        description: "\
Detects buckets where object versioning is not explicitly enabled.

Versioning keeps prior object versions so accidental deletes, overwrites and
ransomware-style encryption of objects can be rolled back.",
        remediation: "\
Set `versioning.enabled` to `true`. Combine with lifecycle rules to expire
noncurrent versions if storage cost is a concern.",
        examples: ExamplePair {
            before: r#"properties:
  versioning:
    enabled: false"#,
            after: r#"properties:
  versioning:
    enabled: true"#,
        },
    }
}

fn explain_access_logging() -> Explanation {
    Explanation {
        title: "Bucket Access Logging Recommended",
        hint: "Configure an access log target bucket for this bucket.",
        description: "\
Detects buckets with no server access logging target.

Access logs are the primary record of who read or changed objects and are
needed for incident response and audits.",
        remediation: "\
Add a `loggings` entry (or `logging` block) with a `targetBucket` and an
optional `targetPrefix`. The target bucket should not log to itself.",
        examples: ExamplePair {
            before: r#"properties:
  acl: private"#,
            after: r#"properties:
  loggings:
    - targetBucket: logs-bucket
      targetPrefix: s3-logs/"#,
        },
    }
}

fn explain_public_access_block() -> Explanation {
    Explanation {
        title: "Public Access Block Required",
        hint: "Attach a public access block with all four block flags set to true.",
        description: "\
Detects buckets that are not covered by a public access block with every flag on.

A public access block overrides bucket-level ACLs and policies. It only fully
protects the bucket when `blockPublicAcls`, `blockPublicPolicy`,
`ignorePublicAcls` and `restrictPublicBuckets` are all `true`. A missing block
and a misconfigured block are reported under this same rule.",
        remediation: "\
Declare a public access block resource in the same stack whose `bucket`
references this bucket and set all four flags to `true`.",
        examples: ExamplePair {
            before: r#"type: aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock
name: assets-pab
properties:
  bucket: assets
  blockPublicAcls: true"#,
            after: r#"type: aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock
name: assets-pab
properties:
  bucket: assets
  blockPublicAcls: true
  blockPublicPolicy: true
  ignorePublicAcls: true
  restrictPublicBuckets: true"#,
        },
    }
}

// --- Workloads ---

fn explain_required_labels() -> Explanation {
    Explanation {
        title: "Required Workload Labels",
        hint: "Add the missing labels to the workload metadata.",
        description: "\
Detects workloads whose `metadata.labels` omit a configured required label.

The default set follows the `app.kubernetes.io/*` recommended labels so that
ownership, version and component are discoverable by tooling. The required set
is configurable per policy.",
        remediation: "\
Add every required key under `metadata.labels`, or adjust `required_labels` in
`stackguard.toml` if your organisation uses a different convention.",
        examples: ExamplePair {
            before: r#"metadata:
  labels:
    app: myapp"#,
            after: r#"metadata:
  labels:
    app.kubernetes.io/name: myapp
    app.kubernetes.io/instance: myapp-prod
    app.kubernetes.io/version: 1.4.2
    app.kubernetes.io/component: api
    app.kubernetes.io/part-of: storefront
    app.kubernetes.io/managed-by: pulumi"#,
        },
    }
}

fn explain_no_mutable_image_tag() -> Explanation {
    Explanation {
        title: "No Mutable Image Tags",
        hint: "Pin the image to an explicit version tag or a digest.",
        description: "\
Detects container images referenced by `latest` or without any tag.

An untagged reference resolves to `latest`. Mutable tags make rollouts
non-reproducible and let a registry push silently change what runs.",
        remediation: "\
Reference an explicit version tag (`nginx:1.21.0`) or, better, a digest
(`nginx@sha256:...`).",
        examples: ExamplePair {
            before: r#"containers:
  - name: app
    image: myapp:latest"#,
            after: r#"containers:
  - name: app
    image: myapp:2.3.1"#,
        },
    }
}

fn explain_no_privileged() -> Explanation {
    Explanation {
        title: "No Privileged Containers",
        hint: "Remove `securityContext.privileged: true` from the container.",
        description: "\
Detects containers running in privileged mode.

A privileged container has all capabilities and access to host devices. A
compromise of the container is effectively a compromise of the node.",
        remediation: "\
Drop `privileged: true`. Grant only the specific capabilities the workload needs
via `securityContext.capabilities.add`.",
        examples: ExamplePair {
            before: r#"securityContext:
  privileged: true"#,
            after: r#"securityContext:
  privileged: false
  capabilities:
    drop: [ALL]"#,
        },
    }
}

fn explain_resource_limits() -> Explanation {
    Explanation {
        title: "Container Resource Limits Required",
        hint: "Set `resources.limits.cpu` and `resources.limits.memory` on the container.",
        description: "\
Detects containers without both CPU and memory limits.

Unbounded containers can starve neighbours on the same node and make capacity
planning impossible.",
        remediation: "\
Declare `resources.limits` with both `cpu` and `memory`, and matching
`resources.requests`.",
        examples: ExamplePair {
            before: r#"containers:
  - name: app
    image: myapp:2.3.1"#,
            after: r#"containers:
  - name: app
    image: myapp:2.3.1
    resources:
      limits:
        cpu: 200m
        memory: 256Mi"#,
        },
    }
}

fn explain_non_root() -> Explanation {
    Explanation {
        title: "Non-Root Containers Required",
        hint: "Set `runAsNonRoot: true` and `allowPrivilegeEscalation: false` in the security context.",
        description: "\
Detects containers that may run as root or escalate privileges.

Both `securityContext.runAsNonRoot: true` and
`securityContext.allowPrivilegeEscalation: false` must be set explicitly;
absent values fall back to permissive runtime defaults.",
        remediation: "\
Build images with a non-root user, then declare both settings in the
container's security context.",
        examples: ExamplePair {
            before: r#"securityContext: {}"#,
            after: r#"securityContext:
  runAsNonRoot: true
  runAsUser: 1000
  allowPrivilegeEscalation: false"#,
        },
    }
}
