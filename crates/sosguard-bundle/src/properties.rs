use crate::BundleState;
use camino::Utf8PathBuf;
use sosguard_expr::{BoxError, PropertyRegistry, Value};
use std::io;

/// Runtime variables available to expressions evaluated against `bundle`:
///
/// | variable               | source                                        |
/// |------------------------|-----------------------------------------------|
/// | `@sos.hostname`        | `hostname`                                    |
/// | `@sos.kernel.release`  | `proc/sys/kernel/osrelease`, else `uname`     |
/// | `@sos.systemd.units`   | unit names from the systemd listings          |
///
/// A missing source file yields `none`.
pub fn bundle_properties(bundle: &BundleState) -> PropertyRegistry {
    let mut registry = PropertyRegistry::new();

    let b = bundle.clone();
    registry.register("sos.hostname", move |_| first_line(b.locate("hostname")));

    let b = bundle.clone();
    registry.register("sos.kernel.release", move |_| kernel_release(&b));

    let units: Vec<Value> = bundle.unit_names().into_iter().map(Value::Str).collect();
    registry.register_value("sos.systemd.units", Value::List(units));

    registry
}

fn kernel_release(bundle: &BundleState) -> Result<Value, BoxError> {
    let release = first_line(bundle.locate("proc/sys/kernel/osrelease"))?;
    if release != Value::None {
        return Ok(release);
    }
    // `uname -a`: Linux <host> <release> ...
    Ok(match read(bundle.locate("uname"))? {
        Some(text) => text
            .split_whitespace()
            .nth(2)
            .map(Value::from)
            .unwrap_or(Value::None),
        None => Value::None,
    })
}

fn first_line(path: Option<Utf8PathBuf>) -> Result<Value, BoxError> {
    Ok(match read(path)? {
        Some(text) => text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(Value::from)
            .unwrap_or(Value::None),
        None => Value::None,
    })
}

fn read(path: Option<Utf8PathBuf>) -> Result<Option<String>, BoxError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(format!("read {path}: {err}").into()),
    }
}
