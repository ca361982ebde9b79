// src/snapshot/walker.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::fs::FileSystem;
use crate::snapshot::hash::compute_file_hash;
use crate::snapshot::path_utils::{relative_str, slash_str};
use crate::snapshot::{Snapshot, SnapshotEntry, SnapshotProvider};
use crate::types::EntryKind;

/// Snapshot provider that walks a [`FileSystem`] and hashes every file.
///
/// Entries are returned sorted by relative path. Read failures anywhere below
/// the root abort the snapshot; a missing root is not a failure.
#[derive(Debug, Clone)]
pub struct FsSnapshotProvider {
    fs: Arc<dyn FileSystem>,
}

impl FsSnapshotProvider {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn walk_directory(&self, root: &Path) -> Result<Vec<SnapshotEntry>> {
        let mut entries = Vec::new();
        let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            for path in self.fs.read_dir(&dir)? {
                let Some(rel) = relative_str(root, &path) else {
                    continue;
                };
                match self.fs.kind(&path)? {
                    EntryKind::Directory => {
                        trace!(path = %rel, "snapshot: directory");
                        entries.push(SnapshotEntry::directory(rel));
                        stack.push(path);
                    }
                    EntryKind::File => {
                        let hash = compute_file_hash(self.fs.as_ref(), &path)?;
                        trace!(path = %rel, hash = %hash.short(), "snapshot: file");
                        entries.push(SnapshotEntry::file(rel, hash));
                    }
                    // Vanished between listing and stat; treat as never seen.
                    EntryKind::Missing => {}
                }
            }
        }

        entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(entries)
    }
}

impl SnapshotProvider for FsSnapshotProvider {
    fn snapshot(&self, root: &Path) -> Result<Snapshot> {
        let kind = self
            .fs
            .kind(root)
            .with_context(|| format!("inspecting input root {:?}", root))?;

        let snapshot = match kind {
            EntryKind::Missing => Snapshot::missing(root),
            EntryKind::File => {
                let canonical = self.fs.canonicalize(root)?;
                let hash = compute_file_hash(self.fs.as_ref(), &canonical)?;
                let name = canonical
                    .file_name()
                    .map(|n| slash_str(Path::new(n)))
                    .unwrap_or_else(|| slash_str(&canonical));
                Snapshot::new(canonical, EntryKind::File, vec![SnapshotEntry::file(name, hash)])
            }
            EntryKind::Directory => {
                let canonical = self.fs.canonicalize(root)?;
                let entries = self
                    .walk_directory(&canonical)
                    .with_context(|| format!("walking input root {:?}", canonical))?;
                Snapshot::new(canonical, EntryKind::Directory, entries)
            }
        };

        debug!(
            root = ?snapshot.root(),
            kind = ?snapshot.root_kind(),
            entries = snapshot.entries().len(),
            "took snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::snapshot::ContentHash;

    fn provider(fs: &MockFileSystem) -> FsSnapshotProvider {
        FsSnapshotProvider::new(Arc::new(fs.clone()))
    }

    #[test]
    fn missing_root_yields_empty_snapshot() {
        let fs = MockFileSystem::new();
        let snap = provider(&fs).snapshot(Path::new("nope")).unwrap();
        assert_eq!(snap.root_kind(), EntryKind::Missing);
        assert!(snap.entries().is_empty());
    }

    #[test]
    fn directory_walk_is_sorted_and_hashes_files() {
        let fs = MockFileSystem::new();
        fs.add_file("src/b.txt", "b");
        fs.add_file("src/a/x.txt", "x");
        fs.add_dir("src/empty");

        let snap = provider(&fs).snapshot(Path::new("src")).unwrap();
        let paths: Vec<&str> = snap
            .entries()
            .iter()
            .map(|e| e.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["a", "a/x.txt", "b.txt", "empty"]);
        assert_eq!(snap.entries()[1].content_hash, Some(ContentHash::of(b"x")));
        assert_eq!(snap.entries()[3].kind, EntryKind::Directory);
    }

    #[test]
    fn listing_order_does_not_leak_into_snapshot() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.txt", "a");
        fs.add_file("src/b/c.txt", "c");
        fs.add_file("src/d.txt", "d");

        let forward = provider(&fs).snapshot(Path::new("src")).unwrap();
        fs.set_listing_reversed(true);
        let backward = provider(&fs).snapshot(Path::new("src")).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn file_root_is_listed_by_name() {
        let fs = MockFileSystem::new();
        fs.add_file("lib/dep.jar", "jar");

        let snap = provider(&fs).snapshot(Path::new("lib/dep.jar")).unwrap();
        assert_eq!(snap.root_kind(), EntryKind::File);
        assert_eq!(snap.entries()[0].relative_path, "dep.jar");
    }

    #[test]
    fn unreadable_file_fails_the_snapshot() {
        let fs = MockFileSystem::new();
        fs.add_file("src/ok.txt", "ok");
        fs.add_file("src/secret.txt", "nope");
        fs.deny("src/secret.txt");

        let err = provider(&fs).snapshot(Path::new("src")).unwrap_err();
        assert!(format!("{err:#}").contains("Permission denied"));
    }
}
