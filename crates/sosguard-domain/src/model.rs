use sosguard_types::Severity;

/// Checks in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Ruleset {
    pub checks: Vec<CheckDef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckDef {
    /// Dotted namespace, e.g. `openstack.nova.debug_enabled`.
    pub id: String,
    pub code: String,
    /// Severity as authored in the rule file.
    pub severity: Severity,
    pub message: String,
    pub help: Option<String>,
    /// Raised when this evaluates truthy.
    pub expression: String,
}

impl Ruleset {
    pub fn get(&self, id: &str) -> Option<&CheckDef> {
        self.checks.iter().find(|c| c.id == id)
    }
}
