//! Rule evaluation (no IO of its own).
//!
//! Input: a ruleset plus an expression context built elsewhere.
//! Output: findings + verdict + summary data.

#![forbid(unsafe_code)]

pub mod fingerprint;
pub mod model;
pub mod policy;
pub mod report;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
pub(crate) mod test_support;

pub use engine::evaluate;
