//! CLI entry point for stackguard.
//!
//! This module stays thin: it handles argument parsing, config loading, I/O, and exit codes.
//! All business logic lives in the `stackguard-app` crate.

mod fetch;
mod logging;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use stackguard_app::{
    format_fixture_suite, format_rules, gate_exit_code, list_rules, parse_report_json,
    render_annotations, render_jsonl, render_markdown, render_text, run_check, run_explain,
    run_fixture_suite, runtime_error_report, serialize_report, to_renderable, CheckInput,
    ExplainOutput,
};
use stackguard_settings::Overrides;
use stackguard_types::StackguardReportV1;

const DEFAULT_CONFIG: &str = "stackguard.toml";

#[derive(Parser, Debug)]
#[command(
    name = "stackguard",
    version,
    about = "Security policy checks for infrastructure-as-code resource stacks"
)]
struct Cli {
    /// Path to a stackguard config TOML (default: ./stackguard.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Fetch the config TOML over HTTP(S) instead of reading a file.
    #[arg(long, global = true, conflicts_with = "config")]
    config_url: Option<String>,

    /// Override profile (strict|baseline or custom).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug). STACKGUARD_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Jsonl,
    Markdown,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate stacks against the rule catalog.
    Check {
        /// A stack directory, or a directory of stack directories.
        #[arg(long, default_value = ".")]
        stack: Utf8PathBuf,

        /// Severity threshold that fails the gate (low|medium|high|critical).
        #[arg(long)]
        fail_on: Option<String>,

        /// Evaluation worker pool size.
        #[arg(long)]
        workers: Option<usize>,

        /// Also write the JSON report here.
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,

        /// What to print on stdout.
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/stackguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/stackguard/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a rule with remediation guidance.
    Explain {
        /// The rule key (e.g., "no-public-acl").
        rule_key: String,
    },

    /// List the rule catalog as configured.
    Rules {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Check fixture stacks against the expectation encoded in their names.
    Fixtures {
        /// Directory containing `*-secure` / `*-insecure` stack directories.
        root: Utf8PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match &cli.cmd {
        Commands::Check {
            stack,
            fail_on,
            workers,
            report_out,
            format,
        } => cmd_check(
            &cli,
            stack,
            fail_on.clone(),
            *workers,
            report_out.as_deref(),
            *format,
        ),
        Commands::Md { report, output } => cmd_md(report, output.as_deref()),
        Commands::Annotations { report, max } => cmd_annotations(report, *max),
        Commands::Explain { rule_key } => cmd_explain(rule_key),
        Commands::Rules { json } => cmd_rules(&cli, *json),
        Commands::Fixtures { root } => cmd_fixtures(&cli, root),
    }
}

/// Config text from `--config-url`, `--config`, or `./stackguard.toml`.
///
/// An explicit `--config` must exist; the implicit default may be absent.
fn load_config_text(cli: &Cli) -> anyhow::Result<String> {
    if let Some(url) = &cli.config_url {
        let client = fetch::ReqwestClient::new(fetch::DEFAULT_TIMEOUT)?;
        return fetch::fetch_config(&client, url, fetch::DEFAULT_ATTEMPTS);
    }
    match &cli.config {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read config: {}", path))
        }
        None => {
            let path = Utf8Path::new(DEFAULT_CONFIG);
            if path.is_file() {
                std::fs::read_to_string(path).with_context(|| format!("read config: {}", path))
            } else {
                Ok(String::new())
            }
        }
    }
}

fn cmd_check(
    cli: &Cli,
    stack: &Utf8Path,
    fail_on: Option<String>,
    workers: Option<usize>,
    report_out: Option<&Utf8Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let config_text = load_config_text(cli)?;
        let output = run_check(CheckInput {
            root: stack,
            config_text: &config_text,
            overrides: Overrides {
                profile: cli.profile.clone(),
                fail_on,
                workers,
            },
            cancel: None,
        })?;

        if let Some(path) = report_out {
            write_report_file(path, &output.report).context("write report json")?;
        }
        print_report(&output.report, format)?;

        Ok(gate_exit_code(output.report.gate.status))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            if let Some(path) = report_out {
                let report = runtime_error_report(&format!("{err:#}"));
                let _ = write_report_file(path, &report);
            }
            eprintln!("stackguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn print_report(report: &StackguardReportV1, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let data = serialize_report(report)?;
            println!("{}", String::from_utf8_lossy(&data));
        }
        OutputFormat::Text => print!("{}", render_text(&to_renderable(report))),
        OutputFormat::Jsonl => print!("{}", render_jsonl(&to_renderable(report))),
        OutputFormat::Markdown => print!("{}", render_markdown(&to_renderable(report))),
    }
    Ok(())
}

fn write_report_file(path: &Utf8Path, report: &StackguardReportV1) -> anyhow::Result<()> {
    let data = serialize_report(report).context("serialize report")?;
    write_file(path, &data)
}

fn write_file(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, data).with_context(|| format!("write: {}", path))?;
    Ok(())
}

fn read_report(path: &Utf8Path) -> anyhow::Result<StackguardReportV1> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read report: {}", path))?;
    parse_report_json(&text)
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report = read_report(report_path)?;
    let md = render_markdown(&to_renderable(&report));

    match output {
        Some(out_path) => write_file(out_path, md.as_bytes()).context("write markdown output")?,
        None => print!("{}", md),
    }
    Ok(())
}

fn cmd_annotations(report_path: &Utf8Path, max: usize) -> anyhow::Result<()> {
    let report = read_report(report_path)?;
    for annotation in render_annotations(&to_renderable(&report), max) {
        println!("{}", annotation);
    }
    Ok(())
}

fn cmd_explain(rule_key: &str) -> anyhow::Result<()> {
    match run_explain(rule_key) {
        ExplainOutput::Found(help) => {
            print!("{}", stackguard_app::format_explanation(&help));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            suggestions,
            available_rule_keys,
        } => {
            eprint!(
                "{}",
                stackguard_app::format_not_found(&identifier, &suggestions, available_rule_keys)
            );
            std::process::exit(1);
        }
    }
}

fn cmd_rules(cli: &Cli, json: bool) -> anyhow::Result<()> {
    let config_text = load_config_text(cli)?;
    let cfg = if config_text.trim().is_empty() {
        stackguard_settings::StackguardConfigV1::default()
    } else {
        stackguard_settings::parse_config_toml(&config_text).context("parse config")?
    };
    let resolved = stackguard_settings::resolve_config(
        cfg,
        Overrides {
            profile: cli.profile.clone(),
            ..Overrides::default()
        },
    )
    .context("resolve config")?;

    let rules = list_rules(&resolved.effective);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rules).context("serialize rules")?
        );
    } else {
        print!("{}", format_rules(&rules));
    }
    Ok(())
}

fn cmd_fixtures(cli: &Cli, root: &Utf8Path) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<bool> {
        let config_text = load_config_text(cli)?;
        let output = run_fixture_suite(
            root,
            &config_text,
            Overrides {
                profile: cli.profile.clone(),
                ..Overrides::default()
            },
        )?;
        print!("{}", format_fixture_suite(&output));
        Ok(output.passed())
    })();

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(2),
        Err(err) => {
            eprintln!("stackguard error: {err:#}");
            std::process::exit(1);
        }
    }
}
