//! Property-based tests for the rule runner.
//!
//! These verify invariants around:
//! - findings ordering determinism regardless of rule order
//! - truncation bounds
//! - verdict derivation from emitted severities

use crate::engine::evaluate;
use crate::model::CheckDef;
use crate::policy::FailOn;
use crate::test_support::{check, config, ruleset};
use proptest::prelude::*;
use sosguard_expr::Context;
use sosguard_types::{Severity, Verdict};

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error),
    ]
}

/// Expressions with a known truthiness, some of them failing outright.
fn arb_expression() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("true".to_string()),
        Just("false".to_string()),
        (0i64..10, 0i64..10).prop_map(|(a, b)| format!("{a} < {b}")),
        Just("len('abc') == 3".to_string()),
        Just("file('etc/hosts')".to_string()),
        Just("len(1)".to_string()),
        Just("(".to_string()),
    ]
}

/// Ids are made unique so reordering cannot swap equal-ranked findings.
fn arb_checks() -> impl Strategy<Value = Vec<CheckDef>> {
    prop::collection::vec(
        (
            prop::string::string_regex("[a-z]{1,6}\\.[a-z]{1,6}").unwrap(),
            arb_severity(),
            arb_expression(),
        ),
        0..12,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (id, sev, expr))| check(&format!("{id}{i}"), sev, &expr))
            .collect()
    })
}

proptest! {
    #[test]
    fn ordering_is_independent_of_rule_order(checks in arb_checks()) {
        let forward = evaluate(&ruleset(checks.clone()), &Context::detached(), &config());
        let mut reversed = checks;
        reversed.reverse();
        let backward = evaluate(&ruleset(reversed), &Context::detached(), &config());
        prop_assert_eq!(forward.findings, backward.findings);
        prop_assert_eq!(forward.verdict, backward.verdict);
    }

    #[test]
    fn emitted_never_exceeds_max(checks in arb_checks(), max in 0usize..6) {
        let mut cfg = config();
        cfg.max_findings = max;
        let report = evaluate(&ruleset(checks), &Context::detached(), &cfg);
        prop_assert!(report.findings.len() <= max);
        prop_assert_eq!(report.data.findings_emitted as usize, report.findings.len());
        prop_assert!(report.data.findings_total >= report.data.findings_emitted);
        prop_assert_eq!(
            report.data.truncated_reason.is_some(),
            report.data.findings_total as usize > max
        );
    }

    #[test]
    fn verdict_follows_worst_severity(checks in arb_checks(), fail_on_warning in any::<bool>()) {
        let mut cfg = config();
        cfg.fail_on = if fail_on_warning { FailOn::Warning } else { FailOn::Error };
        let report = evaluate(&ruleset(checks), &Context::detached(), &cfg);
        let worst = report.findings.iter().map(|f| f.severity).max();
        let expected = match worst {
            Some(Severity::Error) => Verdict::Fail,
            Some(Severity::Warning) if fail_on_warning => Verdict::Fail,
            Some(Severity::Warning) => Verdict::Warn,
            _ => Verdict::Pass,
        };
        prop_assert_eq!(report.verdict, expected);
    }

    #[test]
    fn severities_never_exceed_cap(checks in arb_checks()) {
        let mut cfg = config();
        cfg.severity_cap = Some(Severity::Warning);
        let report = evaluate(&ruleset(checks), &Context::detached(), &cfg);
        prop_assert!(report.findings.iter().all(|f| f.severity <= Severity::Warning));
        prop_assert_ne!(report.verdict, Verdict::Fail);
    }
}
