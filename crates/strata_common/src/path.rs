//! Lexical path utilities for cache invalidation.
//!
//! The invalidation engine reasons about paths it recorded earlier and
//! paths arriving in change events; it must never consult the filesystem
//! (a deleted path cannot be canonicalized). All comparisons here are
//! purely lexical over normalized components.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path lexically: collapses `.` segments and resolves `..`
/// against preceding components where possible.
///
/// Does not touch the filesystem, so it works on paths that no longer
/// (or do not yet) exist. Leading `..` components on relative paths are
/// preserved since there is nothing to resolve them against.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                let last_is_root = matches!(
                    out.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                );
                if last_is_normal {
                    out.pop();
                } else if !last_is_root {
                    // Nothing to resolve against on a relative path.
                    out.push("..");
                }
                // `..` at the root stays at the root.
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Returns `true` if `path` is lexically inside `dir` (strict: a
/// directory is not under itself).
///
/// Comparison is component-wise, so `/a/bc` is not under `/a/b`.
pub fn is_under(path: &Path, dir: &Path) -> bool {
    path != dir && path.starts_with(dir)
}

/// Returns `true` if `path` equals `dir` or is lexically inside it.
pub fn is_at_or_under(path: &Path, dir: &Path) -> bool {
    path.starts_with(dir)
}
