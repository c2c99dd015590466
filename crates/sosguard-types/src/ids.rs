//! Stable identifiers that sosguard itself emits.
//!
//! Check IDs for bundle checks come from rule files; only tool-level IDs live here.

pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";

/// The tool could not complete the run (bad config, unreadable rules, ...).
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";

/// One check's expression failed to parse or evaluate.
pub const CODE_EXPRESSION_ERROR: &str = "expression_error";
