//! CLI tests for the report renderers, `explain`, `rules`, and `fixtures`.

mod common;

use common::{read_json, stackguard_cmd, stacks_dir, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

fn insecure_report(tmp: &TempDir) -> std::path::PathBuf {
    let report_path = tmp.path().join("report.json");
    stackguard_cmd(tmp.path())
        .arg("check")
        .arg("--stack")
        .arg(stacks_dir().join("s3-insecure"))
        .arg("--report-out")
        .arg(&report_path)
        .assert()
        .code(2);
    report_path
}

#[test]
fn md_renders_an_existing_report() {
    let tmp = TempDir::new().expect("temp dir");
    let report = insecure_report(&tmp);
    let out = tmp.path().join("comment.md");

    stackguard_cmd(tmp.path())
        .arg("md")
        .arg("--report")
        .arg(&report)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let md = std::fs::read_to_string(&out).expect("read markdown");
    assert!(md.contains("Gate: **FAIL**"));
    assert!(md.contains("`no-public-acl` on `insecure-bucket`"));
}

#[test]
fn annotations_are_capped_by_max() {
    let tmp = TempDir::new().expect("temp dir");
    let report = insecure_report(&tmp);

    let output = stackguard_cmd(tmp.path())
        .arg("annotations")
        .arg("--report")
        .arg(&report)
        .args(["--max", "2"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("::error file=Pulumi.yaml::[no-public-acl] insecure-bucket:"));
}

#[test]
fn unreadable_report_is_an_error() {
    let tmp = TempDir::new().expect("temp dir");
    write_file(&tmp.path().join("bad.json"), "{\"schema\": \"something.else\"}");
    stackguard_cmd(tmp.path())
        .args(["md", "--report", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown report schema"));
}

#[test]
fn explain_known_rule() {
    let tmp = TempDir::new().expect("temp dir");
    stackguard_cmd(tmp.path())
        .args(["explain", "public-access-block-required"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "public-access-block-required (high) on ObjectStorageBucket\n",
        ))
        .stdout(predicate::str::contains("How to fix:"))
        .stdout(predicate::str::contains("Compliant declaration:"));
}

#[test]
fn explain_unknown_rule_lists_known_keys() {
    let tmp = TempDir::new().expect("temp dir");
    stackguard_cmd(tmp.path())
        .args(["explain", "no-such-rule"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown rule key: no-such-rule"))
        .stderr(predicate::str::contains("Did you mean").not())
        .stderr(predicate::str::contains("no-public-acl"));
}

#[test]
fn rules_lists_the_catalog() {
    let tmp = TempDir::new().expect("temp dir");
    stackguard_cmd(tmp.path())
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("no-privileged-containers"))
        .stdout(predicate::str::contains("WorkloadDeployment"));
}

#[test]
fn rules_json_reflects_config_and_profile() {
    let tmp = TempDir::new().expect("temp dir");
    write_file(
        &tmp.path().join("policy.toml"),
        "[rules.versioning-required]\nenabled = false\n",
    );

    let output = stackguard_cmd(tmp.path())
        .args(["rules", "--json", "--config", "policy.toml", "--profile", "baseline"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let rules: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rules = rules.as_array().expect("array");
    assert_eq!(rules.len(), 10);

    let find = |key: &str| {
        rules
            .iter()
            .find(|r| r["key"] == key)
            .cloned()
            .unwrap_or_else(|| panic!("{key} missing"))
    };
    assert_eq!(find("versioning-required")["enabled"], false);
    assert_eq!(find("access-logging-recommended")["severity"], "low");
    assert_eq!(find("no-public-acl")["enabled"], true);
}

#[test]
fn fixture_suite_passes_on_the_bundled_stacks() {
    let tmp = TempDir::new().expect("temp dir");
    stackguard_cmd(tmp.path())
        .arg("fixtures")
        .arg(stacks_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("4 fixture(s), 4 passed, 0 failed"));
}

#[test]
fn fixture_suite_flags_a_mislabelled_stack() {
    let tmp = TempDir::new().expect("temp dir");
    write_file(
        &tmp.path().join("fixtures/bucket-secure/main.yaml"),
        "type: aws:s3/bucket:Bucket\nname: b\nproperties:\n  acl: public-read\n",
    );

    stackguard_cmd(tmp.path())
        .args(["fixtures", "fixtures"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("FAIL bucket-secure (expected secure)"));
}

#[test]
fn check_report_round_trips_through_md() {
    let tmp = TempDir::new().expect("temp dir");
    let report = insecure_report(&tmp);
    let value = read_json(&report);
    assert_eq!(value["tool"]["name"], "stackguard");

    stackguard_cmd(tmp.path())
        .arg("md")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("## `s3-insecure` (non_compliant)"));
}
