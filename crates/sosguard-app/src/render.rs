//! Markdown rendering of a report, for tickets and CI summaries.

use sosguard_types::{Severity, SosguardReport, Verdict};

pub fn render_markdown(report: &SosguardReport) -> String {
    let mut out = String::new();

    out.push_str("# sosguard report\n\n");
    let verdict = match report.verdict {
        Verdict::Pass => "PASS",
        Verdict::Warn => "WARN",
        Verdict::Fail => "FAIL",
    };
    out.push_str(&format!(
        "- Bundle: `{}`\n- Verdict: **{}**\n- Checks: {} evaluated / {} defined ({} errored)\n\
         - Findings: {} (emitted) / {} (total)\n\n",
        report.data.bundle,
        verdict,
        report.data.checks_evaluated,
        report.data.checks_total,
        report.data.checks_errored,
        report.data.findings_emitted,
        report.data.findings_total
    ));

    if let Some(r) = &report.data.truncated_reason {
        out.push_str(&format!("> Note: {}\n\n", r));
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");

    for f in &report.findings {
        let sev = match f.severity {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        };
        out.push_str(&format!(
            "- [{}] `{}` / `{}`: {}\n",
            sev, f.check_id, f.code, f.message
        ));
        if let Some(help) = &f.help {
            out.push_str(&format!("  - help: {}\n", help));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_error_report;

    #[test]
    fn renders_findings_with_help() {
        let report = runtime_error_report("/srv/sos", "boom");
        let md = render_markdown(&report);
        assert!(md.contains("- Verdict: **FAIL**"));
        assert!(md.contains("- Bundle: `/srv/sos`"));
        assert!(md.contains("[ERROR] `tool.runtime` / `runtime_error`: boom"));
        assert!(md.contains("  - help: Fix the tool error"));
    }

    #[test]
    fn renders_empty_report() {
        let mut report = runtime_error_report("b", "x");
        report.findings.clear();
        report.verdict = Verdict::Pass;
        let md = render_markdown(&report);
        assert!(md.contains("No findings."));
        assert!(md.contains("**PASS**"));
    }
}
