// src/snapshot/mod.rs

//! Raw filesystem snapshots.
//!
//! A [`Snapshot`] is what the normalizers consume: the kind of the declared
//! root plus every entry below it, each with a root-relative path and (for
//! files) a content hash. Producing snapshots is the job of a
//! [`SnapshotProvider`]; [`FsSnapshotProvider`] walks any [`FileSystem`].
//!
//! [`FileSystem`]: crate::fs::FileSystem

pub mod filter;
pub mod hash;
pub mod path_utils;
pub mod walker;

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::types::EntryKind;

pub use filter::{build_globset, PatternFilter};
pub use hash::{compute_file_hash, ContentHash};
pub use walker::FsSnapshotProvider;

/// One entry below a snapshot root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    /// Path relative to the root, forward slashes. For a root that is itself
    /// a file this is the file name.
    pub relative_path: String,
    pub kind: EntryKind,
    /// Content hash for files; `None` for directories.
    pub content_hash: Option<ContentHash>,
}

impl SnapshotEntry {
    pub fn file(relative_path: impl Into<String>, hash: ContentHash) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::File,
            content_hash: Some(hash),
        }
    }

    pub fn directory(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::Directory,
            content_hash: None,
        }
    }
}

/// Raw listing of a declared root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    root: PathBuf,
    root_kind: EntryKind,
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn new(
        root: impl Into<PathBuf>,
        root_kind: EntryKind,
        entries: Vec<SnapshotEntry>,
    ) -> Self {
        Self {
            root: root.into(),
            root_kind,
            entries,
        }
    }

    /// Snapshot of a root that does not exist.
    pub fn missing(root: impl Into<PathBuf>) -> Self {
        Self::new(root, EntryKind::Missing, Vec::new())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn root_kind(&self) -> EntryKind {
        self.root_kind
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Absolute (canonical) location of an entry, forward slashes.
    pub fn absolute_path(&self, entry: &SnapshotEntry) -> String {
        let base = match self.root_kind {
            EntryKind::File => self.root.parent().unwrap_or(&self.root),
            EntryKind::Directory | EntryKind::Missing => &self.root,
        };
        path_utils::slash_str(&base.join(&entry.relative_path))
    }

    /// Copy of this snapshot without the entries rejected by `filter`.
    pub fn filtered(&self, filter: &PatternFilter) -> Snapshot {
        if filter.is_pass_through() {
            return self.clone();
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| filter.accepts(e))
            .cloned()
            .collect();
        Snapshot::new(self.root.clone(), self.root_kind, entries)
    }
}

/// Supplies snapshots of declared roots.
///
/// Implementations must report a missing root as a [`Snapshot::missing`]
/// value; errors are reserved for roots that exist but cannot be read.
pub trait SnapshotProvider: Send + Sync + Debug {
    fn snapshot(&self, root: &Path) -> Result<Snapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_of_file_root_is_the_root() {
        let snap = Snapshot::new(
            "/work/lib/dep.jar",
            EntryKind::File,
            vec![SnapshotEntry::file("dep.jar", ContentHash::of(b"jar"))],
        );
        assert_eq!(snap.absolute_path(&snap.entries()[0]), "/work/lib/dep.jar");
    }

    #[test]
    fn absolute_path_of_nested_entry_joins_root() {
        let snap = Snapshot::new(
            "/work/src",
            EntryKind::Directory,
            vec![SnapshotEntry::file("a/b.rs", ContentHash::of(b"b"))],
        );
        assert_eq!(snap.absolute_path(&snap.entries()[0]), "/work/src/a/b.rs");
    }
}
