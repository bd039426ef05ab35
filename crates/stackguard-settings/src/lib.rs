//! Config parsing and profile/preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{RuleConfig, StackguardConfigV1, SCHEMA_CONFIG_V1};
pub use presets::{preset, PROFILES};
pub use resolve::{parse_severity, parse_unknown_kinds, Overrides, ResolvedConfig};

/// Parse `stackguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<StackguardConfigV1> {
    let cfg: StackguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective policy used by the engine (profile + config file + overrides).
pub fn resolve_config(
    cfg: StackguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
