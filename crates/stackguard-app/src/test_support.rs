use crate::{run_check, CheckInput, CheckOutput};
use camino::Utf8Path;
use stackguard_settings::Overrides;

pub(crate) const INSECURE_BUCKET: &str = "\
resources:
  insecure-bucket:
    type: aws:s3/bucket:Bucket
    properties:
      acl: public-read
";

pub(crate) const SECURE_BUCKET_STACK: &str = "\
resources:
  secure-bucket:
    type: aws:s3/bucket:Bucket
    properties:
      acl: private
      serverSideEncryptionConfiguration:
        rule:
          applyServerSideEncryptionByDefault:
            sseAlgorithm: aws:kms
      versioning:
        enabled: true
      loggings:
        - targetBucket: logs-bucket
  secure-bucket-pab:
    type: aws:s3/bucketPublicAccessBlock:BucketPublicAccessBlock
    properties:
      bucket: ${secure-bucket.id}
      blockPublicAcls: true
      blockPublicPolicy: true
      ignorePublicAcls: true
      restrictPublicBuckets: true
";

pub(crate) fn write_file(path: &Utf8Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}

pub(crate) fn check(
    root: &Utf8Path,
    config_text: &str,
    overrides: Overrides,
) -> anyhow::Result<CheckOutput> {
    run_check(CheckInput {
        root,
        config_text,
        overrides,
        cancel: None,
    })
}
