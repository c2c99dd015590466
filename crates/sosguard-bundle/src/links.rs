//! Symlink resolution confined to the bundle root.
//!
//! A captured host's absolute links (`etc/localtime -> /usr/share/zoneinfo/UTC`)
//! point at that host's filesystem, which is the bundle root here. Links are
//! followed component by component, absolute targets restart at the root and
//! `..` stops at the root, so a lookup never reaches the machine running
//! sosguard.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use tracing::debug;

/// Same limit Linux applies to nested symlinks.
const MAX_LINK_HOPS: usize = 40;

/// Physical location of `rel` inside `root`, with every symlink on the way
/// resolved. `None` on link loops or non-UTF-8 link targets.
///
/// Missing components are kept as written; the caller's stat reports them.
pub(crate) fn resolve_in_root(root: &Utf8Path, rel: &str) -> Option<Utf8PathBuf> {
    let mut pending: Vec<String> = Vec::new();
    push_components(&mut pending, Utf8Path::new(rel));
    let mut resolved: Vec<String> = Vec::new();
    let mut hops = 0usize;

    while let Some(part) = pending.pop() {
        if part == ".." {
            resolved.pop();
            continue;
        }
        let candidate = join(root, &resolved).join(&part);
        let is_link = std::fs::symlink_metadata(&candidate)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if !is_link {
            resolved.push(part);
            continue;
        }

        hops += 1;
        if hops > MAX_LINK_HOPS {
            debug!(path = %rel, "too many levels of symbolic links");
            return None;
        }
        let target = std::fs::read_link(&candidate).ok()?;
        let Ok(target) = Utf8PathBuf::from_path_buf(target) else {
            debug!(link = %candidate, "non-UTF-8 link target");
            return None;
        };
        if target.has_root() {
            resolved.clear();
        }
        push_components(&mut pending, &target);
    }

    Some(join(root, &resolved))
}

/// Push `path`'s components so that the first one is popped first.
fn push_components(stack: &mut Vec<String>, path: &Utf8Path) {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Utf8Component::Normal(s) => Some(s.to_string()),
            Utf8Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    stack.extend(parts.into_iter().rev());
}

fn join(root: &Utf8Path, parts: &[String]) -> Utf8PathBuf {
    let mut out = root.to_path_buf();
    for part in parts {
        out.push(part);
    }
    out
}
