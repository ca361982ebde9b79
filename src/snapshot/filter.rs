// src/snapshot/filter.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::snapshot::path_utils::file_name;
use crate::snapshot::SnapshotEntry;
use crate::types::EntryKind;

/// Compiled include/exclude patterns for one input property.
///
/// Patterns are matched against root-relative paths such as `"a/b.rs"`.
///
/// - Files must match an include pattern (if any are given) and no exclude
///   pattern.
/// - Directories are only subject to exclude patterns; an excluded directory
///   takes its whole subtree with it.
#[derive(Clone, Default)]
pub struct PatternFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for PatternFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternFilter")
            .field("include", &self.include.as_ref().map(|s| s.len()))
            .field("exclude", &self.exclude.as_ref().map(|s| s.len()))
            .finish()
    }
}

impl PatternFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let include = if include.is_empty() {
            None
        } else {
            Some(build_globset(include).context("building include globset")?)
        };
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };
        Ok(Self { include, exclude })
    }

    /// True when the filter keeps everything.
    pub fn is_pass_through(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    pub fn accepts(&self, entry: &SnapshotEntry) -> bool {
        if self.excluded(&entry.relative_path) {
            return false;
        }
        match entry.kind {
            EntryKind::File => match &self.include {
                Some(include) => {
                    include.is_match(&entry.relative_path)
                        || include.is_match(file_name(&entry.relative_path))
                }
                None => true,
            },
            EntryKind::Directory | EntryKind::Missing => true,
        }
    }

    fn excluded(&self, rel_path: &str) -> bool {
        let Some(exclude) = &self.exclude else {
            return false;
        };
        // Check every ancestor too so that `build/**`-style excludes drop the
        // directory and all of its contents.
        let mut current = rel_path;
        loop {
            if exclude.is_match(current) {
                return true;
            }
            match current.rfind('/') {
                Some(idx) => current = &current[..idx],
                None => return false,
            }
        }
    }
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ContentHash;

    fn file(path: &str) -> SnapshotEntry {
        SnapshotEntry::file(path, ContentHash::of(path.as_bytes()))
    }

    #[test]
    fn include_applies_to_files_only() {
        let filter = PatternFilter::new(&["**/*.rs".to_string()], &[]).unwrap();
        assert!(filter.accepts(&file("a/b.rs")));
        assert!(filter.accepts(&file("main.rs")));
        assert!(!filter.accepts(&file("a/notes.md")));
        assert!(filter.accepts(&SnapshotEntry::directory("a")));
    }

    #[test]
    fn excluded_directory_drops_its_contents() {
        let filter = PatternFilter::new(&[], &["generated".to_string()]).unwrap();
        assert!(!filter.accepts(&SnapshotEntry::directory("generated")));
        assert!(!filter.accepts(&file("generated/x.rs")));
        assert!(filter.accepts(&file("src/x.rs")));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        assert!(PatternFilter::new(&["a[".to_string()], &[]).is_err());
    }
}
