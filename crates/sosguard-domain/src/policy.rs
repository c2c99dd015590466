use crate::model::CheckDef;
use sosguard_types::Severity;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    Error,
    Warning,
}

/// Per-check override from config. Checks without one run as authored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckPolicy {
    pub enabled: bool,
    /// Replaces the authored severity when set.
    pub severity: Option<Severity>,
}

impl CheckPolicy {
    pub fn enabled(severity: Severity) -> Self {
        Self {
            enabled: true,
            severity: Some(severity),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            severity: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,
    pub fail_on: FailOn,
    pub max_findings: usize,
    /// Upper bound applied to every emitted severity.
    pub severity_cap: Option<Severity>,
    pub checks: BTreeMap<String, CheckPolicy>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            profile: "strict".to_string(),
            fail_on: FailOn::Error,
            max_findings: 200,
            severity_cap: None,
            checks: BTreeMap::new(),
        }
    }
}

impl EffectiveConfig {
    /// Severity `check` reports at, or `None` when it is disabled.
    pub fn severity_for(&self, check: &CheckDef) -> Option<Severity> {
        let severity = match self.checks.get(&check.id) {
            Some(p) if !p.enabled => return None,
            Some(p) => p.severity.unwrap_or(check.severity),
            None => check.severity,
        };
        Some(self.cap(severity))
    }

    pub fn cap(&self, severity: Severity) -> Severity {
        match self.severity_cap {
            Some(cap) => severity.min(cap),
            None => severity,
        }
    }
}
