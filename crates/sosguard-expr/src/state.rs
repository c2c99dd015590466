//! System-state collaborators consulted by the built-in functions.
//!
//! The engine never touches the filesystem itself. Embedders implement
//! [`SystemState`] over whatever holds the data (a support bundle, a live
//! host, a test double).

use crate::value::Value;
use std::collections::BTreeMap;
use std::io;

/// Named attributes of a looked-up record (`file(path, 'size')`, ...).
pub trait Properties {
    fn property(&self, name: &str) -> Option<Value>;
}

pub trait SystemState {
    /// Stat `path`; `None` when it does not exist.
    fn file(&self, path: &str) -> Option<FileInfo>;

    /// Look up a systemd unit by name; `None` when unknown.
    fn systemd_unit(&self, name: &str) -> Option<SystemdUnit>;

    /// Load an ini-style config file; `None` when missing or unreadable.
    fn ini(&self, path: &str) -> Option<IniDocument>;

    /// Parse the certificate at `path`.
    fn certificate(&self, path: &str) -> io::Result<Certificate>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileInfo {
    pub path: String,
    pub size: u64,
    /// Modification time, seconds since the unix epoch.
    pub mtime: i64,
}

impl Properties for FileInfo {
    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "path" => Some(Value::Str(self.path.clone())),
            "exists" => Some(Value::Bool(true)),
            "size" => Some(Value::Int(i64::try_from(self.size).unwrap_or(i64::MAX))),
            "mtime" => Some(Value::Int(self.mtime)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemdUnit {
    pub name: String,
    /// Unit-file state (`enabled`, `disabled`, `masked`, `static`, ...).
    pub state: Option<String>,
    pub load_state: Option<String>,
    pub active_state: Option<String>,
    pub sub_state: Option<String>,
}

impl Properties for SystemdUnit {
    fn property(&self, name: &str) -> Option<Value> {
        let v = match name {
            "name" => return Some(Value::Str(self.name.clone())),
            "state" => &self.state,
            "load_state" => &self.load_state,
            "active_state" => &self.active_state,
            "sub_state" => &self.sub_state,
            _ => return None,
        };
        Some(v.clone().into())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Certificate {
    pub path: String,
    /// `YYYY-MM-DD` of the `notAfter` field.
    pub expiry_date: String,
    /// Whole days between the reference clock and expiry; negative once expired.
    pub days_to_expire: i64,
}

impl Properties for Certificate {
    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "path" => Some(Value::Str(self.path.clone())),
            "expiry_date" => Some(Value::Str(self.expiry_date.clone())),
            "days_to_expire" => Some(Value::Int(self.days_to_expire)),
            _ => None,
        }
    }
}

/// Section used for keys that appear before any `[section]` header.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Parsed ini-style config: section -> key -> value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IniDocument {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: &str, key: &str, value: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Look `key` up in `section`, falling back to [`DEFAULT_SECTION`].
    /// Without a section, the default section is searched first and then
    /// every other section in name order.
    pub fn get(&self, section: Option<&str>, key: &str) -> Option<&str> {
        let lookup = |s: &str| {
            self.sections
                .get(s)
                .and_then(|keys| keys.get(key))
                .map(String::as_str)
        };
        match section {
            Some(s) => lookup(s).or_else(|| lookup(DEFAULT_SECTION)),
            None => lookup(DEFAULT_SECTION).or_else(|| {
                self.sections
                    .values()
                    .find_map(|keys| keys.get(key))
                    .map(String::as_str)
            }),
        }
    }
}

/// State with nothing in it; every lookup reports absence.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullState;

impl SystemState for NullState {
    fn file(&self, _path: &str) -> Option<FileInfo> {
        None
    }

    fn systemd_unit(&self, _name: &str) -> Option<SystemdUnit> {
        None
    }

    fn ini(&self, _path: &str) -> Option<IniDocument> {
        None
    }

    fn certificate(&self, path: &str) -> io::Result<Certificate> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no certificate at {path}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ini_section_falls_back_to_default() {
        let mut doc = IniDocument::new();
        doc.insert(DEFAULT_SECTION, "debug", "False");
        doc.insert("api", "workers", "4");

        assert_eq!(doc.get(Some("api"), "workers"), Some("4"));
        assert_eq!(doc.get(Some("api"), "debug"), Some("False"));
        assert_eq!(doc.get(None, "workers"), Some("4"));
        assert_eq!(doc.get(Some("db"), "workers"), None);
    }

    #[test]
    fn unit_properties_map_unset_to_none() {
        let unit = SystemdUnit {
            name: "nova-compute.service".to_string(),
            state: Some("enabled".to_string()),
            ..SystemdUnit::default()
        };
        assert_eq!(unit.property("state"), Some(Value::from("enabled")));
        assert_eq!(unit.property("active_state"), Some(Value::None));
        assert_eq!(unit.property("pid"), None);
    }
}
