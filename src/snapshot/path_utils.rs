// src/snapshot/path_utils.rs

//! Utility functions for turning filesystem paths into snapshot keys.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` does not live under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(slash_str)
}

/// Render a path with forward slashes regardless of platform.
pub fn slash_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Last segment of a forward-slash relative path.
pub fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

/// Forward-slash parent of a relative path, or `None` at the top level.
pub fn parent(rel: &str) -> Option<&str> {
    rel.rfind('/').map(|idx| &rel[..idx])
}
