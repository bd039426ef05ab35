use crate::adapters::AdapterRegistry;
use crate::document::{decode, DocumentFormat, RawDocument};
use crate::graph::parse_graph;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use stackguard_domain::policy::UnknownKinds;
use stackguard_domain::ResourceGraph;
use stackguard_types::StackPath;
use walkdir::WalkDir;

/// One stack read from disk.
#[derive(Clone, Debug)]
pub struct LoadedStack {
    pub name: String,
    pub root: Utf8PathBuf,
    pub graph: ResourceGraph,
}

/// Stack document files below `dir`, in sorted stack-relative order.
pub fn stack_files(dir: &Utf8Path) -> anyhow::Result<Vec<(StackPath, DocumentFormat)>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {dir}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(abs) = Utf8Path::from_path(entry.path()) else {
            tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 path");
            continue;
        };
        let Some(format) = abs.extension().and_then(DocumentFormat::from_extension) else {
            continue;
        };
        out.push((StackPath::relative_to(dir, abs), format));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Decode every document file of the stack rooted at `dir`, in file order.
pub fn read_stack_documents(dir: &Utf8Path) -> anyhow::Result<Vec<RawDocument>> {
    let mut docs = Vec::new();
    for (rel, format) in stack_files(dir)? {
        let abs = dir.join(rel.as_str());
        let text = std::fs::read_to_string(&abs).with_context(|| format!("read {abs}"))?;
        let decoded = decode(&rel, &text, format)?;
        tracing::debug!(file = %rel, documents = decoded.len(), "decoded stack file");
        docs.extend(decoded);
    }
    Ok(docs)
}

/// Read and adapt the stack rooted at `dir`. The stack is named after the directory.
///
/// Malformed input surfaces as a [`crate::MalformedResourceError`] inside the
/// returned error, so callers can tell it apart from I/O failures.
pub fn load_stack(
    dir: &Utf8Path,
    registry: &AdapterRegistry,
    unknown_kinds: UnknownKinds,
) -> anyhow::Result<LoadedStack> {
    let docs = read_stack_documents(dir).with_context(|| format!("load stack {dir}"))?;
    let graph = parse_graph(docs, registry, unknown_kinds)?;
    Ok(LoadedStack {
        name: stack_name(dir),
        root: dir.to_path_buf(),
        graph,
    })
}

pub fn stack_name(dir: &Utf8Path) -> String {
    dir.file_name()
        .map(str::to_string)
        .unwrap_or_else(|| dir.as_str().to_string())
}

/// Stack directories under `root`.
///
/// A directory is a stack when it directly contains document files. Stack directories
/// are not searched for nested stacks. When `root` itself is a stack it is the only
/// result.
pub fn discover_stacks(root: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    if has_documents(root)? {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut out = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.with_context(|| format!("walk {root}"))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(dir) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if has_documents(dir)? {
            out.push(dir.to_path_buf());
            walker.skip_current_dir();
        }
    }
    out.sort();
    Ok(out)
}

fn has_documents(dir: &Utf8Path) -> anyhow::Result<bool> {
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {dir}"))? {
        let entry = entry.with_context(|| format!("read dir {dir}"))?;
        let path = entry.path();
        let is_doc = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension)
            .is_some();
        if is_doc && path.is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedResourceError;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
    }

    fn write_file(path: &Utf8Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write file");
    }

    #[test]
    fn files_are_read_in_sorted_order() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        write_file(
            &root.join("b.yaml"),
            "type: aws:s3/bucket:Bucket\nname: second\n",
        );
        write_file(
            &root.join("a.json"),
            r#"{"type": "aws:s3/bucket:Bucket", "name": "first"}"#,
        );
        write_file(&root.join("README.md"), "# not a document\n");

        let stack = load_stack(&root, &AdapterRegistry::builtin(), UnknownKinds::Reject)
            .expect("load");
        let ids: Vec<&str> = stack.graph.resources().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn malformed_documents_are_recoverable_from_the_error() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        write_file(&root.join("main.yaml"), "name: orphan\n");

        let err = load_stack(&root, &AdapterRegistry::builtin(), UnknownKinds::Reject)
            .expect_err("malformed");
        let malformed = err
            .downcast_ref::<MalformedResourceError>()
            .expect("malformed resource error");
        assert_eq!(
            malformed.document().map(|d| d.source.as_str()),
            Some("main.yaml")
        );
    }

    #[test]
    fn exported_secure_bucket_stack_is_compliant() {
        use stackguard_domain::policy::EffectivePolicy;
        use stackguard_domain::rules::builtin_catalog;

        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        let export = serde_json::json!({
            "version": 3,
            "deployment": { "resources": [
                {
                    "urn": "urn:pulumi:dev::s3::pulumi:pulumi:Stack::s3-dev",
                    "type": "pulumi:pulumi:Stack"
                },
                {
                    "urn": "urn:pulumi:dev::s3::aws:s3/bucket:Bucket::secure-bucket",
                    "type": "aws:s3/bucket:Bucket",
                    "id": "secure-bucket-4f2a1c9",
                    "inputs": {
                        "acl": "private",
                        "serverSideEncryptionConfiguration": {
                            "rule": { "applyServerSideEncryptionByDefault": { "sseAlgorithm": "AES256" } }
                        },
                        "versioning": { "enabled": true },
                        "loggings": [{ "targetBucket": "logs-bucket" }]
                    },
                    "outputs": { "id": "secure-bucket-4f2a1c9", "bucket": "secure-bucket-4f2a1c9" }
                },
                {
                    "urn": "urn:pulumi:dev::s3::aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock::secure-bucket-public-access",
                    "type": "aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock",
                    "id": "secure-bucket-4f2a1c9",
                    "inputs": {
                        "bucket": "secure-bucket-4f2a1c9",
                        "blockPublicAcls": true,
                        "blockPublicPolicy": true,
                        "ignorePublicAcls": true,
                        "restrictPublicBuckets": true
                    }
                }
            ]}
        });
        write_file(&root.join("stack.json"), &export.to_string());

        let stack = load_stack(&root, &AdapterRegistry::builtin(), UnknownKinds::Reject)
            .expect("load");
        assert_eq!(stack.graph.len(), 2);

        let catalog = builtin_catalog(&EffectivePolicy::default()).expect("catalog");
        let report = stackguard_domain::evaluate(&stack.graph, &catalog);
        assert!(
            report.is_compliant(),
            "{:?}",
            report.violations().collect::<Vec<_>>()
        );
    }

    #[test]
    fn discover_finds_stack_directories() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        write_file(&root.join("z-stack/main.yaml"), "[]\n");
        write_file(&root.join("group/a-stack/main.json"), "[]");
        write_file(&root.join("group/a-stack/nested/inner.yaml"), "[]\n");
        write_file(&root.join("empty/notes.txt"), "");

        let stacks = discover_stacks(&root).expect("discover");
        let rel: Vec<String> = stacks
            .iter()
            .map(|p| StackPath::relative_to(&root, p).to_string())
            .collect();
        assert_eq!(rel, vec!["group/a-stack".to_string(), "z-stack".to_string()]);
    }

    #[test]
    fn discover_returns_root_when_it_is_a_stack() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        write_file(&root.join("main.yaml"), "[]\n");
        assert_eq!(discover_stacks(&root).expect("discover"), vec![root.clone()]);
    }

    #[test]
    fn stack_name_is_the_directory_name() {
        assert_eq!(stack_name(Utf8Path::new("fixtures/s3-secure")), "s3-secure");
    }
}
