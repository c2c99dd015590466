use crate::fingerprint::fingerprint_for_check;
use crate::model::{CheckDef, Ruleset};
use crate::policy::{EffectiveConfig, FailOn};
use crate::report::{DomainReport, SeverityCounts};
use serde_json::{json, Value as JsonValue};
use sosguard_expr::{Context, Engine, ExprError, Value};
use sosguard_types::{ids, Finding, Severity, SosguardData, Verdict};
use tracing::{debug, warn};

/// Evaluate every enabled check once, in declaration order.
///
/// An expression that fails to parse or evaluate does not stop the run: it
/// becomes a `tool.runtime` finding and the remaining checks still execute.
pub fn evaluate(ruleset: &Ruleset, ctx: &Context<'_>, cfg: &EffectiveConfig) -> DomainReport {
    let engine = Engine::new();
    let mut findings: Vec<Finding> = Vec::new();
    let mut evaluated = 0u32;
    let mut errored = 0u32;

    for check in &ruleset.checks {
        let Some(severity) = cfg.severity_for(check) else {
            debug!(check_id = %check.id, "check disabled");
            continue;
        };
        evaluated += 1;

        match engine.evaluate(&check.expression, ctx) {
            Ok(result) if result.is_truthy() => {
                debug!(check_id = %check.id, %result, "check raised");
                findings.push(check_finding(check, severity, &result));
            }
            Ok(result) => debug!(check_id = %check.id, %result, "check clear"),
            Err(err) => {
                errored += 1;
                warn!(check_id = %check.id, error = %err, "expression failed");
                findings.push(expression_error_finding(check, &err, cfg));
            }
        }
    }

    // Deterministic ordering before truncation.
    findings.sort_by(compare_findings);

    let total = findings.len() as u32;

    let mut emitted = findings;
    let mut truncated_reason: Option<String> = None;
    if emitted.len() > cfg.max_findings {
        emitted.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let verdict = compute_verdict(&emitted, cfg.fail_on);
    let counts = SeverityCounts::from_findings(&emitted);

    let data = SosguardData {
        profile: cfg.profile.clone(),
        bundle: String::new(),
        checks_total: ruleset.checks.len() as u32,
        checks_evaluated: evaluated,
        checks_errored: errored,
        findings_total: total,
        findings_emitted: emitted.len() as u32,
        truncated_reason,
    };

    DomainReport {
        verdict,
        findings: emitted,
        data,
        counts,
    }
}

fn check_finding(check: &CheckDef, severity: Severity, result: &Value) -> Finding {
    Finding {
        severity,
        check_id: check.id.clone(),
        code: check.code.clone(),
        message: check.message.clone(),
        help: check.help.clone(),
        fingerprint: Some(fingerprint_for_check(&check.id, &check.code, &check.message)),
        data: json!({
            "expression": check.expression,
            "result": value_json(result),
        }),
    }
}

fn expression_error_finding(check: &CheckDef, err: &ExprError, cfg: &EffectiveConfig) -> Finding {
    let message = format!("check '{}' could not be evaluated: {err}", check.id);
    Finding {
        severity: cfg.cap(Severity::Error),
        check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
        code: ids::CODE_EXPRESSION_ERROR.to_string(),
        fingerprint: Some(fingerprint_for_check(
            ids::CHECK_TOOL_RUNTIME,
            ids::CODE_EXPRESSION_ERROR,
            &message,
        )),
        message,
        help: Some(
            "Fix the expression in the rule file; `sosguard lint` reports parse errors."
                .to_string(),
        ),
        data: json!({
            "check": check.id,
            "expression": check.expression,
            "error_kind": err.kind().as_str(),
        }),
    }
}

fn value_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::List(items) => JsonValue::Array(items.iter().map(value_json).collect()),
        Value::None | Value::NotFound(_) => JsonValue::Null,
    }
}

fn compute_verdict(findings: &[Finding], fail_on: FailOn) -> Verdict {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    if has_error {
        return Verdict::Fail;
    }

    let has_warn = findings.iter().any(|f| f.severity == Severity::Warning);
    if has_warn {
        return match fail_on {
            FailOn::Warning => Verdict::Fail,
            FailOn::Error => Verdict::Warn,
        };
    }

    Verdict::Pass
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) severity (error -> warning -> info)
    // 2) check_id
    // 3) code
    // 4) message
    b.severity
        .cmp(&a.severity)
        .then(a.check_id.cmp(&b.check_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}
