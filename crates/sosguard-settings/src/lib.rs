//! Config and rule-file parsing, plus profile/preset resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;
mod rules;

pub use model::{CheckConfig, RuleEntry, RulesFileV1, SosguardConfigV1};
pub use resolve::{Overrides, ResolvedConfig};
pub use rules::{build_ruleset, SCHEMA_RULES_V1};

use sosguard_domain::model::Ruleset;

/// Parse `sosguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<SosguardConfigV1> {
    let cfg: SosguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the rule runner (profile + overrides + per-check config).
pub fn resolve_config(
    cfg: SosguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}

/// Parse and validate a rule file.
pub fn parse_rules_toml(input: &str) -> anyhow::Result<Ruleset> {
    let file: RulesFileV1 = toml::from_str(input)?;
    build_ruleset(file)
}
