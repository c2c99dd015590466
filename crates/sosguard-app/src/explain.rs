//! The `explain` use case: show what a check in a rule file looks for.

use anyhow::Context;
use sosguard_domain::model::CheckDef;

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(CheckDef),
    /// Unknown identifier; includes the check ids the rule file defines.
    NotFound {
        identifier: String,
        available_check_ids: Vec<String>,
    },
}

/// Look up a check by id, or by code when no id matches.
pub fn run_explain(rules_text: &str, identifier: &str) -> anyhow::Result<ExplainOutput> {
    let ruleset = sosguard_settings::parse_rules_toml(rules_text).context("parse rules")?;
    let found = ruleset
        .get(identifier)
        .or_else(|| ruleset.checks.iter().find(|c| c.code == identifier));
    Ok(match found {
        Some(check) => ExplainOutput::Found(check.clone()),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_check_ids: ruleset.checks.iter().map(|c| c.id.clone()).collect(),
        },
    })
}

/// Format a check for terminal display.
pub fn format_explanation(check: &CheckDef) -> String {
    let mut out = String::new();

    out.push_str(&check.id);
    out.push('\n');
    out.push_str(&"=".repeat(check.id.len()));
    out.push_str("\n\n");
    out.push_str(&format!("code:     {}\n", check.code));
    out.push_str(&format!("severity: {}\n", check.severity.as_str()));
    out.push_str(&format!("message:  {}\n\n", check.message));
    out.push_str("Expression\n");
    out.push_str("----------\n");
    out.push_str(&check.expression);
    out.push('\n');

    if let Some(help) = &check.help {
        out.push_str("\nRemediation\n");
        out.push_str("-----------\n");
        out.push_str(help);
        out.push('\n');
    }

    out
}
