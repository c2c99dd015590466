//! The `lint` use case: parse every expression in a rule file without evaluating it.

use anyhow::Context;
use sosguard_expr::Grammar;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LintProblem {
    pub check_id: String,
    pub error_kind: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct LintOutput {
    pub checks: usize,
    pub problems: Vec<LintProblem>,
}

impl LintOutput {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Structural problems with the rule file are errors; unparsable
/// expressions are collected as problems.
pub fn lint_rules(rules_text: &str) -> anyhow::Result<LintOutput> {
    let ruleset = sosguard_settings::parse_rules_toml(rules_text).context("parse rules")?;
    let grammar = Grammar::new();

    let problems = ruleset
        .checks
        .iter()
        .filter_map(|check| {
            grammar
                .parse(&check.expression)
                .err()
                .map(|err| LintProblem {
                    check_id: check.id.clone(),
                    error_kind: err.kind().as_str(),
                    message: err.to_string(),
                })
        })
        .collect();

    Ok(LintOutput {
        checks: ruleset.checks.len(),
        problems,
    })
}
