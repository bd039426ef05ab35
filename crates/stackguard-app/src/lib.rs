//! Use case orchestration for stackguard.
//!
//! This crate provides the application layer: use cases that coordinate the settings, stack,
//! domain, and render layers. It stays thin and delegates heavy lifting to those layers.
//!
//! The CLI crate depends on this; it only handles argument parsing, I/O, and exit codes.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod fixtures;
mod render;
mod report;
mod rules;

pub use check::{gate_exit_code, run_check, CheckInput, CheckOutput};
pub use explain::{format_explanation, format_not_found, run_explain, ExplainOutput, RuleHelp};
pub use fixtures::{
    expectation_for, format_fixture_suite, run_fixture_suite, Expectation, FixtureCase,
    FixtureSuiteOutput,
};
pub use render::{render_annotations, render_jsonl, render_markdown, render_text};
pub use report::{parse_report_json, runtime_error_report, serialize_report, to_renderable};
pub use rules::{format_rules, list_rules, RuleListing};

#[cfg(test)]
pub(crate) mod test_support;
