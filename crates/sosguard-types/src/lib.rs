//! Stable DTOs and IDs used across the sosguard workspace.
//!
//! - data types for the emitted report
//! - tool-level check IDs and codes
//! - canonical bundle-relative path handling

#![forbid(unsafe_code)]

pub mod ids;
pub mod path;
pub mod report;

pub use path::BundlePath;
pub use report::{
    Finding, ReportEnvelope, Severity, SosguardData, SosguardReport, ToolMeta, Verdict,
    SCHEMA_REPORT_V1,
};
