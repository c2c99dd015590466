//! The `eval` use case: evaluate one expression, optionally against a bundle.

use anyhow::Context as _;
use camino::Utf8Path;
use sosguard_bundle::{bundle_properties, BundleState};
use sosguard_expr::{Context, Value};
use time::OffsetDateTime;

#[derive(Clone, Debug)]
pub struct EvalInput<'a> {
    pub expression: &'a str,
    /// Without a bundle every lookup reports absence.
    pub bundle_root: Option<&'a Utf8Path>,
    pub now: Option<OffsetDateTime>,
}

/// Evaluate `input.expression`.
///
/// Expression failures are returned as an [`sosguard_expr::ExprError`]
/// inside the `anyhow::Error`, so callers can downcast for the error kind.
pub fn run_eval(input: EvalInput<'_>) -> anyhow::Result<Value> {
    let Some(root) = input.bundle_root else {
        return Ok(sosguard_expr::evaluate(input.expression, &Context::detached())?);
    };

    let mut bundle = BundleState::open(root).context("open bundle")?;
    if let Some(now) = input.now {
        bundle = bundle.with_now(now);
    }
    let properties = bundle_properties(&bundle);
    let ctx = Context::new(&bundle, &properties);
    Ok(sosguard_expr::evaluate(input.expression, &ctx)?)
}
