//! Use case orchestration for sosguard.
//!
//! This crate coordinates settings, bundle, and domain layers. The CLI
//! depends on it and only handles argument parsing, IO, and exit codes.

#![forbid(unsafe_code)]

mod check;
mod eval;
mod explain;
mod lint;
mod render;
mod report;

pub use check::{run_check, verdict_exit_code, CheckInput, CheckOutput};
pub use eval::{run_eval, EvalInput};
pub use explain::{format_explanation, run_explain, ExplainOutput};
pub use lint::{lint_rules, LintOutput, LintProblem};
pub use render::render_markdown;
pub use report::{parse_report_json, report_schema_json, runtime_error_report, serialize_report};
