use anyhow::Context;
use schemars::schema_for;
use sosguard_types::{
    ids, Finding, ReportEnvelope, Severity, SosguardData, SosguardReport, Verdict,
    SCHEMA_REPORT_V1,
};
use time::OffsetDateTime;

use crate::check::tool_meta;

pub fn parse_report_json(text: &str) -> anyhow::Result<SosguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema}");
    }
    serde_json::from_value(value).context("parse sosguard report")
}

pub fn serialize_report(report: &SosguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

/// JSON Schema of the report envelope.
pub fn report_schema_json() -> anyhow::Result<String> {
    serde_json::to_string_pretty(&schema_for!(SosguardReport)).context("serialize schema")
}

/// Report for a run that could not complete. Always fails.
pub fn runtime_error_report(bundle: &str, message: &str) -> SosguardReport {
    let now = OffsetDateTime::now_utc();
    let data = SosguardData {
        profile: "unknown".to_string(),
        bundle: bundle.to_string(),
        findings_total: 1,
        findings_emitted: 1,
        ..SosguardData::default()
    };

    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at: now,
        finished_at: now,
        verdict: Verdict::Fail,
        findings: vec![Finding {
            severity: Severity::Error,
            check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message: message.to_string(),
            help: Some("Fix the tool error and re-run sosguard.".to_string()),
            fingerprint: None,
            data: serde_json::Value::Null,
        }],
        data,
    }
}
