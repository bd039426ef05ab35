//! The `fixtures` use case: check every stack under a root against the expectation encoded in
//! its name.
//!
//! - `*-secure` / `secure-*`: no violations at all.
//! - `*-insecure` / `insecure-*`: at least one violation, and at least one of severity `high`
//!   or above.
//! - anything else: only required to evaluate without error.

use crate::check::{run_check, CheckInput};
use camino::Utf8Path;
use stackguard_settings::Overrides;
use stackguard_types::{Severity, StackResult, StackStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expectation {
    Secure,
    Insecure,
    None,
}

impl Expectation {
    pub fn as_str(self) -> &'static str {
        match self {
            Expectation::Secure => "secure",
            Expectation::Insecure => "insecure",
            Expectation::None => "none",
        }
    }
}

/// `insecure` is tested first since `-insecure` also ends with `secure`.
pub fn expectation_for(stack_name: &str) -> Expectation {
    if stack_name.ends_with("-insecure") || stack_name.starts_with("insecure-") {
        Expectation::Insecure
    } else if stack_name.ends_with("-secure") || stack_name.starts_with("secure-") {
        Expectation::Secure
    } else {
        Expectation::None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureCase {
    pub stack: String,
    pub expectation: Expectation,
    pub passed: bool,
    pub detail: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixtureSuiteOutput {
    pub cases: Vec<FixtureCase>,
}

impl FixtureSuiteOutput {
    pub fn passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FixtureCase> {
        self.cases.iter().filter(|c| !c.passed)
    }
}

pub fn run_fixture_suite(
    root: &Utf8Path,
    config_text: &str,
    overrides: Overrides,
) -> anyhow::Result<FixtureSuiteOutput> {
    let output = run_check(CheckInput {
        root,
        config_text,
        overrides,
        cancel: None,
    })?;

    let cases = output.report.stacks.iter().map(judge).collect();
    Ok(FixtureSuiteOutput { cases })
}

fn judge(stack: &StackResult) -> FixtureCase {
    let expectation = expectation_for(&stack.name);
    let summary = &stack.summary;
    let worst = summary
        .worst_severity
        .map(Severity::as_str)
        .unwrap_or("none");

    let (passed, detail) = if stack.status == StackStatus::Error {
        (
            false,
            format!(
                "could not be evaluated: {}",
                stack.error.as_deref().unwrap_or("unknown error")
            ),
        )
    } else {
        let counts = format!("{} violation(s), worst {}", summary.violation_count, worst);
        let passed = match expectation {
            Expectation::Secure => summary.violation_count == 0,
            Expectation::Insecure => {
                summary.violation_count > 0 && summary.worst_severity >= Some(Severity::High)
            }
            Expectation::None => true,
        };
        (passed, counts)
    };

    FixtureCase {
        stack: stack.name.clone(),
        expectation,
        passed,
        detail,
    }
}

pub fn format_fixture_suite(output: &FixtureSuiteOutput) -> String {
    let mut out = String::new();
    for case in &output.cases {
        out.push_str(&format!(
            "{} {} (expected {}): {}\n",
            if case.passed { "ok  " } else { "FAIL" },
            case.stack,
            case.expectation.as_str(),
            case.detail
        ));
    }
    let failed = output.failures().count();
    out.push_str(&format!(
        "{} fixture(s), {} passed, {} failed\n",
        output.cases.len(),
        output.cases.len() - failed,
        failed
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_file, INSECURE_BUCKET, SECURE_BUCKET_STACK};

    #[test]
    fn naming_contract() {
        assert_eq!(expectation_for("s3-secure"), Expectation::Secure);
        assert_eq!(expectation_for("secure-deployment"), Expectation::Secure);
        assert_eq!(expectation_for("s3-insecure"), Expectation::Insecure);
        assert_eq!(expectation_for("insecure-deployment"), Expectation::Insecure);
        assert_eq!(expectation_for("staging"), Expectation::None);
        assert_eq!(expectation_for("securely"), Expectation::None);
    }

    #[test]
    fn matching_fixtures_pass() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let root = camino::Utf8Path::from_path(tmp.path()).expect("utf8 path");
        write_file(&root.join("s3-insecure/main.yaml"), INSECURE_BUCKET);
        write_file(&root.join("s3-secure/main.yaml"), SECURE_BUCKET_STACK);

        let output = run_fixture_suite(root, "", Overrides::default()).expect("suite");
        assert_eq!(output.cases.len(), 2);
        assert!(output.passed(), "{}", format_fixture_suite(&output));
    }

    #[test]
    fn mislabelled_and_malformed_fixtures_fail() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let root = camino::Utf8Path::from_path(tmp.path()).expect("utf8 path");
        write_file(&root.join("bucket-secure/main.yaml"), INSECURE_BUCKET);
        write_file(&root.join("broken-insecure/main.yaml"), "name: orphan\n");

        let output = run_fixture_suite(root, "", Overrides::default()).expect("suite");
        assert!(!output.passed());
        let failed: Vec<&str> = output.failures().map(|c| c.stack.as_str()).collect();
        assert_eq!(failed, vec!["broken-insecure", "bucket-secure"]);

        let text = format_fixture_suite(&output);
        assert!(text.contains("FAIL bucket-secure (expected secure)"));
        assert!(text.ends_with("2 fixture(s), 0 passed, 2 failed\n"));
    }
}
