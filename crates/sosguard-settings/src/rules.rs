use crate::model::{RuleEntry, RulesFileV1};
use crate::resolve::parse_severity;
use anyhow::Context;
use sosguard_domain::model::{CheckDef, Ruleset};
use sosguard_types::Severity;
use std::collections::BTreeSet;

/// Schema identifier for rule files.
pub const SCHEMA_RULES_V1: &str = "sosguard.rules.v1";

/// Validate a parsed rule file and turn it into a [`Ruleset`].
///
/// Expressions are not parsed here; the rule runner reports broken ones
/// per check, and `lint` catches them ahead of time.
pub fn build_ruleset(file: RulesFileV1) -> anyhow::Result<Ruleset> {
    if let Some(schema) = file.schema.as_deref()
        && schema != SCHEMA_RULES_V1
    {
        anyhow::bail!("unsupported rules schema: {schema} (expected {SCHEMA_RULES_V1})");
    }

    let mut seen = BTreeSet::new();
    let mut checks = Vec::with_capacity(file.checks.len());
    for (index, entry) in file.checks.into_iter().enumerate() {
        let check = check_def(entry).with_context(|| format!("check #{}", index + 1))?;
        if !seen.insert(check.id.clone()) {
            anyhow::bail!("duplicate check id: {}", check.id);
        }
        checks.push(check);
    }
    Ok(Ruleset { checks })
}

fn check_def(entry: RuleEntry) -> anyhow::Result<CheckDef> {
    let id = entry.id.trim().to_string();
    if id.is_empty() {
        anyhow::bail!("check id must not be empty");
    }
    if entry.expression.trim().is_empty() {
        anyhow::bail!("check {id} has an empty expression");
    }
    let severity = match entry.severity.as_deref() {
        Some(s) => parse_severity(s).with_context(|| format!("invalid severity for {id}"))?,
        None => Severity::Warning,
    };
    let code = entry
        .code
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| id.rsplit('.').next().unwrap_or(&id).to_string());

    Ok(CheckDef {
        id,
        code,
        severity,
        message: entry.message,
        help: entry.help,
        expression: entry.expression,
    })
}

#[cfg(test)]
mod tests {
    use crate::parse_rules_toml;
    use sosguard_types::Severity;

    #[test]
    fn parses_checks_in_order_with_defaults() {
        let rules = parse_rules_toml(
            r#"
schema = "sosguard.rules.v1"

[[check]]
id = "openstack.nova.debug_enabled"
severity = "warning"
message = "nova is running with debug enabled"
help = "Set debug = False in nova.conf"
expression = "read_ini('etc/nova/nova.conf', 'debug', 'DEFAULT', 'False') == 'True'"

[[check]]
id = "host.sshd.inactive"
code = "sshd_down"
message = "sshd is not active"
expression = "systemd('sshd.service', 'active_state') != 'active'"
"#,
        )
        .unwrap();

        assert_eq!(rules.checks.len(), 2);
        let first = &rules.checks[0];
        assert_eq!(first.code, "debug_enabled");
        assert_eq!(first.severity, Severity::Warning);
        assert_eq!(first.help.as_deref(), Some("Set debug = False in nova.conf"));

        let second = rules.get("host.sshd.inactive").unwrap();
        assert_eq!(second.code, "sshd_down");
        assert_eq!(second.severity, Severity::Warning);
    }

    #[test]
    fn rejects_invalid_rule_files() {
        let dup = r#"
[[check]]
id = "a.b"
message = "m"
expression = "true"
[[check]]
id = "a.b"
message = "m"
expression = "false"
"#;
        let err = parse_rules_toml(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate check id: a.b"));

        let empty_expr = "[[check]]\nid = \"a.b\"\nmessage = \"m\"\nexpression = \"  \"\n";
        assert!(parse_rules_toml(empty_expr).is_err());

        let empty_id = "[[check]]\nid = \"\"\nmessage = \"m\"\nexpression = \"true\"\n";
        assert!(parse_rules_toml(empty_id).is_err());

        let bad_sev =
            "[[check]]\nid = \"a.b\"\nseverity = \"loud\"\nmessage = \"m\"\nexpression = \"true\"\n";
        let err = parse_rules_toml(bad_sev).unwrap_err();
        assert!(format!("{err:#}").contains("invalid severity for a.b"));

        assert!(parse_rules_toml("schema = \"other.v9\"").is_err());
    }

    #[test]
    fn broken_expressions_are_left_to_the_runner() {
        let rules =
            parse_rules_toml("[[check]]\nid = \"a.b\"\nmessage = \"m\"\nexpression = \"1 +\"\n")
                .unwrap();
        assert_eq!(rules.checks[0].expression, "1 +");
    }
}
