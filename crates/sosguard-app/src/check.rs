//! The `check` use case: evaluate a ruleset against a bundle and produce a report.

use anyhow::Context as _;
use camino::Utf8Path;
use sosguard_bundle::{bundle_properties, BundleState};
use sosguard_expr::Context;
use sosguard_settings::{Overrides, ResolvedConfig, SosguardConfigV1};
use sosguard_types::{ReportEnvelope, SosguardReport, ToolMeta, Verdict, SCHEMA_REPORT_V1};
use time::OffsetDateTime;
use tracing::info;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Extracted bundle root.
    pub bundle_root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// Rule file contents.
    pub rules_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Reference clock for certificate expiry; defaults to now.
    pub now: Option<OffsetDateTime>,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: SosguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Parse config and rules, open the bundle, evaluate, produce the report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        SosguardConfigV1::default()
    } else {
        sosguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };

    let resolved = sosguard_settings::resolve_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let ruleset = sosguard_settings::parse_rules_toml(input.rules_text).context("parse rules")?;

    let mut bundle = BundleState::open(input.bundle_root).context("open bundle")?;
    if let Some(now) = input.now {
        bundle = bundle.with_now(now);
    }
    let properties = bundle_properties(&bundle);
    let ctx = Context::new(&bundle, &properties);

    let sosguard_domain::report::DomainReport {
        verdict,
        findings,
        mut data,
        counts,
    } = sosguard_domain::evaluate(&ruleset, &ctx, &resolved.effective);
    data.bundle = input.bundle_root.as_str().to_string();

    info!(
        verdict = ?verdict,
        errors = counts.error,
        warnings = counts.warning,
        infos = counts.info,
        "check complete"
    );

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        verdict,
        findings,
        data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "sosguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}
