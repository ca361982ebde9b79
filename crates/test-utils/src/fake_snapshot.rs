use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use taskprint::snapshot::{ContentHash, Snapshot, SnapshotEntry, SnapshotProvider};
use taskprint::types::EntryKind;

#[derive(Debug, Default)]
struct FakeState {
    snapshots: BTreeMap<PathBuf, Snapshot>,
    failing: BTreeSet<PathBuf>,
    calls: Vec<PathBuf>,
}

/// A fake snapshot provider that:
/// - serves snapshots registered up front (unknown roots are missing)
/// - records every root it was asked for
/// - fails on demand for selected roots.
///
/// Clones share state, so a test can keep one handle and give another to
/// the engine.
#[derive(Debug, Clone, Default)]
pub struct FakeSnapshotProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory root with `(relative path, content)` files.
    pub fn with_dir(&self, root: impl AsRef<Path>, files: &[(&str, &str)]) -> &Self {
        let entries = files
            .iter()
            .map(|(path, content)| SnapshotEntry::file(*path, ContentHash::of(content.as_bytes())))
            .collect();
        self.insert(Snapshot::new(root.as_ref(), EntryKind::Directory, entries))
    }

    /// Register an arbitrary snapshot under its own root.
    pub fn insert(&self, snapshot: Snapshot) -> &Self {
        self.state
            .lock()
            .unwrap()
            .snapshots
            .insert(snapshot.root().to_path_buf(), snapshot);
        self
    }

    /// Make every snapshot of `root` fail.
    pub fn fail(&self, root: impl AsRef<Path>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(root.as_ref().to_path_buf());
        self
    }

    /// Roots requested so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl SnapshotProvider for FakeSnapshotProvider {
    fn snapshot(&self, root: &Path) -> anyhow::Result<Snapshot> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(root.to_path_buf());

        if state.failing.contains(root) {
            anyhow::bail!("injected failure reading {}", root.display());
        }

        Ok(state
            .snapshots
            .get(root)
            .cloned()
            .unwrap_or_else(|| Snapshot::missing(root)))
    }
}
