// src/normalize/builtin.rs

use std::collections::HashSet;

use crate::normalize::{FileNormalizer, NormalizedEntry};
use crate::snapshot::path_utils::{file_name, parent};
use crate::snapshot::{ContentHash, Snapshot, SnapshotEntry};
use crate::types::{EntryKind, PathSensitivity};

/// Normalization strategies that ship with taskprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinNormalizer {
    /// Keys follow the property's path sensitivity; empty directories are
    /// kept as marker entries.
    Default,
    /// Like `Default`, but directories never contribute entries.
    IgnoreEmptyDirectories,
}

impl BuiltinNormalizer {
    pub const ALL: [BuiltinNormalizer; 2] = [
        BuiltinNormalizer::Default,
        BuiltinNormalizer::IgnoreEmptyDirectories,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.id() == id)
    }

    fn keeps_empty_directories(self) -> bool {
        matches!(self, BuiltinNormalizer::Default)
    }
}

impl FileNormalizer for BuiltinNormalizer {
    fn id(&self) -> &str {
        match self {
            BuiltinNormalizer::Default => "default",
            BuiltinNormalizer::IgnoreEmptyDirectories => "ignore-empty-directories",
        }
    }

    fn normalize(&self, snapshot: &Snapshot, sensitivity: PathSensitivity) -> Vec<NormalizedEntry> {
        if snapshot.root_kind() == EntryKind::Missing {
            return Vec::new();
        }

        // Canonical enumeration order, so "last duplicate wins" later on does
        // not depend on how the filesystem listed things.
        let mut raw: Vec<&SnapshotEntry> = snapshot.entries().iter().collect();
        raw.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let non_empty_dirs: HashSet<&str> = snapshot
            .entries()
            .iter()
            .filter_map(|e| parent(e.relative_path.as_str()))
            .flat_map(|p| ancestors(p))
            .collect();

        let mut out = Vec::with_capacity(raw.len());
        for entry in raw {
            let content_hash = match (entry.kind, entry.content_hash) {
                (EntryKind::File, Some(hash)) => hash,
                (EntryKind::Directory, _) => {
                    if !self.keeps_empty_directories()
                        || non_empty_dirs.contains(entry.relative_path.as_str())
                    {
                        continue;
                    }
                    ContentHash::EMPTY_DIRECTORY
                }
                // Files without a hash and missing entries have no content.
                _ => continue,
            };
            out.push(NormalizedEntry::new(
                normalized_key(snapshot, entry, sensitivity),
                content_hash,
            ));
        }
        out
    }
}

/// Key for `entry` under `sensitivity`.
pub fn normalized_key(
    snapshot: &Snapshot,
    entry: &SnapshotEntry,
    sensitivity: PathSensitivity,
) -> String {
    match sensitivity {
        PathSensitivity::Absolute => snapshot.absolute_path(entry),
        PathSensitivity::Relative => entry.relative_path.clone(),
        PathSensitivity::NameOnly => file_name(&entry.relative_path).to_string(),
        PathSensitivity::None => String::new(),
    }
}

/// `a/b/c` -> `a/b/c`, `a/b`, `a`.
fn ancestors(rel: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(rel), |current| parent(*current))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> ContentHash {
        ContentHash::of(s.as_bytes())
    }

    fn tree() -> Snapshot {
        Snapshot::new(
            "/work/src",
            EntryKind::Directory,
            vec![
                SnapshotEntry::directory("pkg"),
                SnapshotEntry::file("pkg/a.txt", h("a")),
                SnapshotEntry::directory("pkg/deep"),
                SnapshotEntry::directory("pkg/deep/er"),
                SnapshotEntry::file("pkg/deep/er/b.txt", h("b")),
                SnapshotEntry::directory("void"),
            ],
        )
    }

    fn keys(entries: &[NormalizedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn keys_follow_sensitivity() {
        let snap = tree();
        let n = BuiltinNormalizer::Default;

        assert_eq!(
            keys(&n.normalize(&snap, PathSensitivity::Absolute)),
            vec!["/work/src/pkg/a.txt", "/work/src/pkg/deep/er/b.txt", "/work/src/void"]
        );
        assert_eq!(
            keys(&n.normalize(&snap, PathSensitivity::Relative)),
            vec!["pkg/a.txt", "pkg/deep/er/b.txt", "void"]
        );
        assert_eq!(
            keys(&n.normalize(&snap, PathSensitivity::NameOnly)),
            vec!["a.txt", "b.txt", "void"]
        );
        assert_eq!(
            keys(&n.normalize(&snap, PathSensitivity::None)),
            vec!["", "", ""]
        );
    }

    #[test]
    fn only_empty_directories_get_markers() {
        let entries = BuiltinNormalizer::Default.normalize(&tree(), PathSensitivity::Relative);
        let markers: Vec<&str> = entries
            .iter()
            .filter(|e| e.is_empty_directory())
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(markers, vec!["void"]);
    }

    #[test]
    fn ignore_empty_directories_drops_markers() {
        let entries = BuiltinNormalizer::IgnoreEmptyDirectories
            .normalize(&tree(), PathSensitivity::Relative);
        assert_eq!(keys(&entries), vec!["pkg/a.txt", "pkg/deep/er/b.txt"]);
    }

    #[test]
    fn missing_root_normalizes_to_nothing() {
        let snap = Snapshot::missing("/work/nope");
        assert!(BuiltinNormalizer::Default
            .normalize(&snap, PathSensitivity::Absolute)
            .is_empty());
    }

    #[test]
    fn ids_round_trip() {
        for builtin in BuiltinNormalizer::ALL {
            assert_eq!(BuiltinNormalizer::from_id(builtin.id()), Some(builtin));
        }
        assert_eq!(BuiltinNormalizer::from_id("classpath"), None);
    }
}
