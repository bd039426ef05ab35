//! Developer tasks (schema generation, conformance checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use stackguard_test_util::normalize_nondeterministic;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(manifest_dir)
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn stacks_dir() -> PathBuf {
    project_root().join("tests").join("fixtures").join("stacks")
}

/// Golden reports live next to the fixture stacks as `expected/<stack>.report.json`.
fn golden_dir() -> PathBuf {
    project_root().join("tests").join("fixtures").join("expected")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(stackguard_types::StackguardReportV1)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(stackguard_settings::StackguardConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "stackguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "stackguard.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

/// Emit schemas to the schemas/ directory.
fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }

    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {}", name);
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {}", name);
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Run the stackguard binary over the fixture stacks and validate");
    eprintln!("                    its reports against the report schema and golden files");
    eprintln!("  explain-coverage  Validate all rule keys have explanations");
}

/// Token pattern for gate reasons.
fn is_valid_token(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Check that a path is clean: no absolute paths, no `../`, forward slashes only.
fn is_clean_path(path: &str) -> bool {
    !(path.starts_with('/')
        || path.starts_with('\\')
        || path.contains("..")
        || path.contains('\\')
        // Reject Windows-style drive letters like C:
        || (path.len() >= 2 && path.as_bytes()[1] == b':'))
}

/// Path and token hygiene of one report.
fn hygiene_errors(label: &str, report: &serde_json::Value) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(reasons) = report["gate"]["reasons"].as_array() {
        for reason in reasons.iter().filter_map(|r| r.as_str()) {
            if !is_valid_token(reason) {
                errors.push(format!("{label}: gate reason '{reason}' is not a valid token"));
            }
        }
    }

    for (si, stack) in report["stacks"].as_array().into_iter().flatten().enumerate() {
        if let Some(path) = stack["path"].as_str()
            && !is_clean_path(path)
        {
            errors.push(format!("{label}: stacks[{si}].path '{path}' is not clean"));
        }
        for (vi, verdict) in stack["verdicts"].as_array().into_iter().flatten().enumerate() {
            if let Some(path) = verdict["location"]["path"].as_str()
                && !is_clean_path(path)
            {
                errors.push(format!(
                    "{label}: stacks[{si}].verdicts[{vi}].location.path '{path}' is not clean \
                     (no absolute, no ../, forward slashes only)"
                ));
            }
        }
    }

    errors
}

/// Run the built `stackguard` binary over every fixture stack and check its reports.
fn conform() -> anyhow::Result<()> {
    let schema_path = schemas_dir().join("stackguard.report.v1.json");
    if !schema_path.exists() {
        bail!(
            "stackguard.report.v1.json not found at {}\n\nRun `cargo xtask emit-schemas` first.",
            schema_path.display()
        );
    }
    let schema_content = fs::read_to_string(&schema_path)
        .with_context(|| format!("Failed to read {}", schema_path.display()))?;
    let schema_value: serde_json::Value =
        serde_json::from_str(&schema_content).context("Failed to parse report schema")?;
    let compiled = jsonschema::validator_for(&schema_value)
        .map_err(|e| anyhow::anyhow!("Failed to compile schema: {}", e))?;
    println!("✓ stackguard.report.v1.json schema compiles");

    let bin = project_root().join("target").join("debug").join("stackguard");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");
    if !bin.exists() {
        bail!(
            "stackguard binary not found at {}.\nRun `cargo build -p stackguard-cli` first.",
            bin.display()
        );
    }

    let mut errors = Vec::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(stacks_dir())
        .context("Failed to read tests/fixtures/stacks/")?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    entries.sort();

    for stack_dir in entries {
        let name = stack_dir
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let report_out = temp_dir.path().join("report.json");

        let output = std::process::Command::new(&bin)
            .arg("check")
            .arg("--stack")
            .arg(&stack_dir)
            .arg("--report-out")
            .arg(&report_out)
            .output()
            .with_context(|| format!("Failed to run stackguard on fixture '{}'", name))?;

        // 0 and 2 both mean a report was produced; 1 is a checker failure.
        if !matches!(output.status.code(), Some(0) | Some(2)) {
            errors.push(format!(
                "fixture '{}': stackguard exited with {:?}: {}",
                name,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            ));
            continue;
        }

        let report_content = fs::read_to_string(&report_out)
            .with_context(|| format!("fixture '{}': no report output generated", name))?;
        let report_value: serde_json::Value = serde_json::from_str(&report_content)
            .with_context(|| format!("Failed to parse report for fixture '{}'", name))?;

        for err in compiled.iter_errors(&report_value) {
            errors.push(format!("fixture '{}': schema validation: {}", name, err));
        }
        errors.extend(hygiene_errors(&format!("fixture '{name}'"), &report_value));

        let golden_path = golden_dir().join(format!("{name}.report.json"));
        if golden_path.exists() {
            let golden_content = fs::read_to_string(&golden_path)?;
            let golden_value: serde_json::Value = serde_json::from_str(&golden_content)?;
            if normalize_nondeterministic(report_value) != normalize_nondeterministic(golden_value)
            {
                errors.push(format!(
                    "fixture '{}': output differs from golden file {}",
                    name,
                    golden_path.display()
                ));
            } else {
                println!("  ✓ fixture '{}' matches golden report", name);
            }
        } else {
            println!("  ✓ fixture '{}' produces a valid report (no golden file)", name);
        }
    }

    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {}", err);
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ Conformance checks passed!");
    Ok(())
}

/// Validate that all rule keys have complete explanations.
fn explain_coverage() -> anyhow::Result<()> {
    let keys = stackguard_types::explain::all_rule_keys();
    let mut errors = Vec::new();

    for key in keys {
        match stackguard_types::explain::lookup_explanation(key) {
            Some(exp) => {
                for (field, value) in [
                    ("title", exp.title),
                    ("hint", exp.hint),
                    ("description", exp.description),
                    ("remediation", exp.remediation),
                    ("before example", exp.examples.before),
                    ("after example", exp.examples.after),
                ] {
                    if value.trim().is_empty() {
                        errors.push(format!("Rule '{}' has empty {}", key, field));
                    }
                }
            }
            None => errors.push(format!("Rule '{}' has no explanation", key)),
        }
    }

    if errors.is_empty() {
        println!("✓ {} rule keys have explanations", keys.len());
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {}", error);
        }
        bail!("Explain coverage validation failed with {} errors", errors.len())
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            println!("{}", stackguard_types::SCHEMA_REPORT_V1);
            println!("{}", stackguard_settings::SCHEMA_CONFIG_V1);
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
