//! Support-bundle adapter: answers expression lookups from an extracted bundle.
//!
//! This crate is allowed to do filesystem IO, and spawns `openssl` to read
//! certificates. Everything else in the workspace reaches the bundle only
//! through the [`SystemState`] implementation here.

#![forbid(unsafe_code)]

mod cert;
mod files;
mod ini;
mod links;
mod properties;
mod systemd;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use sosguard_expr::{Certificate, FileInfo, IniDocument, SystemState, SystemdUnit};
use sosguard_types::BundlePath;
use std::collections::BTreeMap;
use std::io;
use time::OffsetDateTime;
use tracing::debug;

pub use ini::parse_ini;
pub use properties::bundle_properties;
pub use systemd::{UNIT_FILES_LISTING, UNITS_LISTING};

/// Fuzz-friendly parsers. **Never panic** on any input.
pub mod fuzz {
    pub fn parse_ini(text: &str) {
        let _ = crate::ini::parse_ini(text);
    }

    pub fn parse_systemd_listings(unit_files: &str, units: &str) {
        let _ = crate::systemd::parse_listings(Some(unit_files), Some(units));
    }
}

/// An extracted support bundle on disk.
#[derive(Clone, Debug)]
pub struct BundleState {
    root: Utf8PathBuf,
    now: OffsetDateTime,
    units: BTreeMap<String, SystemdUnit>,
}

impl BundleState {
    /// Open the bundle rooted at `root` and index its systemd listings.
    pub fn open(root: &Utf8Path) -> anyhow::Result<Self> {
        let meta = std::fs::metadata(root).with_context(|| format!("open bundle {root}"))?;
        if !meta.is_dir() {
            anyhow::bail!("bundle root is not a directory: {root}");
        }

        let unit_files = read_optional(&root.join(UNIT_FILES_LISTING))?;
        let units = read_optional(&root.join(UNITS_LISTING))?;
        let units = systemd::parse_listings(unit_files.as_deref(), units.as_deref());
        debug!(%root, units = units.len(), "bundle opened");

        Ok(Self {
            root: root.to_path_buf(),
            now: OffsetDateTime::now_utc(),
            units,
        })
    }

    /// Reference clock for certificate expiry.
    pub fn with_now(mut self, now: OffsetDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Known unit names in sorted order.
    pub fn unit_names(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }

    /// Map a host path into the bundle; `None` when it escapes the root.
    ///
    /// Symlinks inside the bundle are resolved against the bundle root, not
    /// the local filesystem.
    pub(crate) fn locate(&self, path: &str) -> Option<Utf8PathBuf> {
        let rel = BundlePath::new(path);
        if rel.escapes_root() {
            debug!(%path, "path escapes bundle root");
            return None;
        }
        links::resolve_in_root(&self.root, rel.as_str())
    }
}

impl SystemState for BundleState {
    fn file(&self, path: &str) -> Option<FileInfo> {
        let abs = self.locate(path)?;
        files::stat(&abs, path)
    }

    fn systemd_unit(&self, name: &str) -> Option<SystemdUnit> {
        self.units.get(name).cloned()
    }

    fn ini(&self, path: &str) -> Option<IniDocument> {
        let abs = self.locate(path)?;
        files::read_text(&abs).map(|text| parse_ini(&text))
    }

    fn certificate(&self, path: &str) -> io::Result<Certificate> {
        let abs = self.locate(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{path} is outside the bundle"))
        })?;
        cert::read_certificate(&abs, path, self.now)
    }
}

/// Read a file that may legitimately be missing from a bundle.
fn read_optional(path: &Utf8Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("read {path}")),
    }
}
