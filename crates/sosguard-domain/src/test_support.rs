use crate::model::{CheckDef, Ruleset};
use crate::policy::EffectiveConfig;
use sosguard_types::Severity;

pub fn check(id: &str, severity: Severity, expression: &str) -> CheckDef {
    CheckDef {
        id: id.to_string(),
        code: id.rsplit('.').next().unwrap_or(id).to_string(),
        severity,
        message: format!("{id} raised"),
        help: None,
        expression: expression.to_string(),
    }
}

pub fn ruleset(checks: Vec<CheckDef>) -> Ruleset {
    Ruleset { checks }
}

pub fn config() -> EffectiveConfig {
    EffectiveConfig {
        profile: "test".to_string(),
        ..EffectiveConfig::default()
    }
}
