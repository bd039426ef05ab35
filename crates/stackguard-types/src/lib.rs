//! Stable DTOs and IDs used across the stackguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted report
//! - stable rule keys and reason codes
//! - canonical stack-relative path handling
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod path;
pub mod receipt;

pub use explain::{lookup_explanation, ExamplePair, Explanation};
pub use path::StackPath;
pub use receipt::{
    Gate, GateStatus, Location, Outcome, ReportEnvelope, Severity, SeverityCounts, StackResult,
    StackStatus, StackguardData, StackguardReportV1, Summary, ToolMeta, Verdict, SCHEMA_REPORT_V1,
};
