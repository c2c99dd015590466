use camino::{Utf8Component, Utf8Path};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical bundle-relative path.
///
/// Expressions name files the way they appear on the captured host
/// (`/etc/nova/nova.conf`); inside a bundle they live under the root.
/// Normalization:
/// - always forward slashes (`/`)
/// - no leading `/` or `./`
/// - `.` components dropped
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct BundlePath(String);

impl Default for BundlePath {
    fn default() -> Self {
        BundlePath::new(".")
    }
}

impl BundlePath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let v = s.as_ref().replace('\\', "/");
        let parts: Vec<&str> = v
            .split('/')
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .collect();
        if parts.is_empty() {
            return Self(".".to_string());
        }
        Self(parts.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `..` components climb above the bundle root.
    pub fn escapes_root(&self) -> bool {
        let mut depth: usize = 0;
        for component in Utf8Path::new(&self.0).components() {
            match component {
                Utf8Component::ParentDir => {
                    if depth == 0 {
                        return true;
                    }
                    depth -= 1;
                }
                Utf8Component::Normal(_) => depth += 1,
                _ => {}
            }
        }
        false
    }
}

impl From<&str> for BundlePath {
    fn from(value: &str) -> Self {
        BundlePath::new(value)
    }
}

impl From<&Utf8Path> for BundlePath {
    fn from(value: &Utf8Path) -> Self {
        BundlePath::new(value.as_str())
    }
}

impl std::fmt::Display for BundlePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_host_paths_become_relative() {
        assert_eq!(BundlePath::new("/etc/nova/nova.conf").as_str(), "etc/nova/nova.conf");
        assert_eq!(BundlePath::new("./etc//hosts").as_str(), "etc/hosts");
        assert_eq!(BundlePath::new("etc\\hosts").as_str(), "etc/hosts");
        assert_eq!(BundlePath::new("/").as_str(), ".");
    }

    #[test]
    fn parent_components_that_escape_are_detected() {
        assert!(BundlePath::new("../etc/shadow").escapes_root());
        assert!(BundlePath::new("etc/../../x").escapes_root());
        assert!(!BundlePath::new("etc/nova/../hosts").escapes_root());
    }
}
