use sosguard_domain::policy::{EffectiveConfig, FailOn};
use sosguard_types::Severity;
use std::collections::BTreeMap;

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything per-check belongs in `sosguard.toml`.
pub fn preset(profile: &str) -> EffectiveConfig {
    match profile {
        "advisory" => advisory_profile(),
        // default
        _ => strict_profile(),
    }
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        severity_cap: None,
        checks: BTreeMap::new(),
    }
}

/// Reports everything, fails nothing.
fn advisory_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "advisory".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        severity_cap: Some(Severity::Warning),
        checks: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_profiles_fall_back_to_strict() {
        assert_eq!(preset("paranoid").profile, "strict");
        assert_eq!(preset("advisory").severity_cap, Some(Severity::Warning));
        assert_eq!(preset("strict").severity_cap, None);
    }
}
