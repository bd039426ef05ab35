#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// Command for the stackguard binary, run from `cwd` so no ambient `stackguard.toml` is picked up.
#[allow(deprecated)]
pub fn stackguard_cmd(cwd: &Path) -> Command {
    let mut cmd =
        Command::cargo_bin("stackguard").expect("stackguard binary not found - run `cargo build` first");
    cmd.current_dir(cwd).env_remove("STACKGUARD_LOG");
    cmd
}

/// Repo root / tests / fixtures / stacks.
pub fn stacks_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("stackguard-cli crate should have a parent directory")
        .parent()
        .expect("crates directory should have a parent (repo root)")
        .join("tests")
        .join("fixtures")
        .join("stacks")
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("read report");
    serde_json::from_str(&text).expect("report is JSON")
}

pub const PRIVATE_BUCKET: &str = "\
type: aws:s3/bucket:Bucket
name: plain-bucket
properties:
  acl: private
";
