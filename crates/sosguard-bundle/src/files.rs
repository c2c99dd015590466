use camino::Utf8Path;
use sosguard_expr::FileInfo;
use std::io;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Stat `abs`; `path` is the name the expression used.
pub(crate) fn stat(abs: &Utf8Path, path: &str) -> Option<FileInfo> {
    let meta = match std::fs::metadata(abs) {
        Ok(meta) => meta,
        Err(err) => {
            log_miss(abs, &err);
            return None;
        }
    };
    let mtime = meta
        .modified()
        .map(|t| OffsetDateTime::from(t).unix_timestamp())
        .unwrap_or_default();
    Some(FileInfo {
        path: path.to_string(),
        size: meta.len(),
        mtime,
    })
}

/// Whole file as text; `None` when missing or unreadable.
pub(crate) fn read_text(abs: &Utf8Path) -> Option<String> {
    match std::fs::read(abs) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            log_miss(abs, &err);
            None
        }
    }
}

fn log_miss(abs: &Utf8Path, err: &io::Error) {
    if err.kind() == io::ErrorKind::NotFound {
        debug!(path = %abs, "not in bundle");
    } else {
        warn!(path = %abs, error = %err, "unreadable bundle file");
    }
}
