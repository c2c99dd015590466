//! Runtime variables (`@dotted.path`).

use crate::error::{BoxError, ExprError};
use crate::state::SystemState;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Resolves the value behind `@path`. Failures propagate to the caller.
pub trait PropertyResolver {
    fn resolve(&self, path: &str, state: &dyn SystemState) -> Result<Value, ExprError>;
}

type Accessor = Box<dyn Fn(&dyn SystemState) -> Result<Value, BoxError> + Send + Sync>;

/// Explicit registry of runtime variables, filled once by the embedder.
///
/// Nothing is cached: every `@path` occurrence calls its accessor.
#[derive(Default)]
pub struct PropertyRegistry {
    accessors: BTreeMap<String, Accessor>,
}

impl PropertyRegistry {
    pub const fn new() -> Self {
        Self {
            accessors: BTreeMap::new(),
        }
    }

    pub fn register<F>(&mut self, path: impl Into<String>, accessor: F) -> &mut Self
    where
        F: Fn(&dyn SystemState) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.accessors.insert(path.into(), Box::new(accessor));
        self
    }

    /// Register a variable whose value never changes.
    pub fn register_value(&mut self, path: impl Into<String>, value: Value) -> &mut Self {
        self.register(path, move |_| Ok(value.clone()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.accessors.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("paths", &self.accessors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PropertyResolver for PropertyRegistry {
    fn resolve(&self, path: &str, state: &dyn SystemState) -> Result<Value, ExprError> {
        let accessor = self
            .accessors
            .get(path)
            .ok_or_else(|| ExprError::UnknownVariable {
                path: path.to_string(),
            })?;
        accessor(state).map_err(|source| ExprError::Resolve {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NullState;

    #[test]
    fn registered_values_resolve() {
        let mut registry = PropertyRegistry::new();
        registry.register_value("sos.hostname", Value::from("compute-0"));
        assert_eq!(
            registry.resolve("sos.hostname", &NullState).unwrap(),
            Value::from("compute-0")
        );
        assert!(registry.contains("sos.hostname"));
    }

    #[test]
    fn unknown_paths_fail() {
        let registry = PropertyRegistry::new();
        let err = registry.resolve("sos.nope", &NullState).unwrap_err();
        assert!(matches!(err, ExprError::UnknownVariable { .. }));
    }

    #[test]
    fn accessor_errors_keep_their_source() {
        let mut registry = PropertyRegistry::new();
        registry.register("sos.broken", |_| Err("disk on fire".into()));
        let err = registry.resolve("sos.broken", &NullState).unwrap_err();
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "disk on fire");
    }
}
