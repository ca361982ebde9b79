// src/fs/mock.rs

use super::FileSystem;
use crate::types::EntryKind;
use anyhow::{anyhow, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(BTreeSet<String>), // Child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths whose reads fail with a simulated permission error.
    denied: HashSet<PathBuf>,
}

/// In-memory filesystem for tests.
///
/// Directory listings are returned in insertion-independent order, but
/// [`MockFileSystem::set_listing_reversed`] flips them so tests can check
/// that results do not depend on enumeration order.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
    reversed: Arc<Mutex<bool>>,
}

fn parent_of(path: &Path) -> Option<&Path> {
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        Some(Path::new("."))
    } else {
        Some(parent)
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        // Ensure root exists
        fs.lock()
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(BTreeSet::new()));
        fs
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        state.entries.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_to_parent(&mut state, &path);
    }

    /// Create an (initially empty) directory and its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        Self::ensure_dir_entry(&mut state, path.as_ref());
    }

    /// Remove a file or a whole directory subtree.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock();
        state.entries.retain(|p, _| !p.starts_with(path));
        if let Some(parent) = parent_of(path) {
            if let (Some(MockEntry::Dir(children)), Some(name)) = (
                state.entries.get_mut(parent),
                path.file_name().and_then(|n| n.to_str()),
            ) {
                children.remove(name);
            }
        }
    }

    /// Make every read of `path` fail as if permission were denied.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.lock().denied.insert(path.as_ref().to_path_buf());
    }

    pub fn set_listing_reversed(&self, reversed: bool) {
        *self.reversed.lock().unwrap_or_else(|p| p.into_inner()) = reversed;
    }

    fn link_to_parent(state: &mut MockState, path: &Path) {
        if let Some(parent) = parent_of(path) {
            if parent == path {
                return;
            }
            Self::ensure_dir_entry(state, parent);
            if let (Some(MockEntry::Dir(children)), Some(name)) = (
                state.entries.get_mut(parent),
                path.file_name().and_then(|n| n.to_str()),
            ) {
                children.insert(name.to_string());
            }
        }
    }

    fn ensure_dir_entry(state: &mut MockState, path: &Path) {
        if !state.entries.contains_key(path) {
            state
                .entries
                .insert(path.to_path_buf(), MockEntry::Dir(BTreeSet::new()));
            Self::link_to_parent(state, path);
        }
    }

    fn check_access(state: &MockState, path: &Path) -> Result<()> {
        if state.denied.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let mut reader = self.open_read(path)?;
        let mut out = String::new();
        reader
            .read_to_string(&mut out)
            .map_err(|e| anyhow!("Invalid UTF-8: {}", e))?;
        Ok(out)
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let state = self.lock();
        Self::check_access(&state, path)?;
        match state.entries.get(path) {
            Some(MockEntry::File(content)) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn kind(&self, path: &Path) -> Result<EntryKind> {
        let state = self.lock();
        Self::check_access(&state, path)?;
        Ok(match state.entries.get(path) {
            Some(MockEntry::File(_)) => EntryKind::File,
            Some(MockEntry::Dir(_)) => EntryKind::Directory,
            None => EntryKind::Missing,
        })
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is, assuming tests use stable paths
        Ok(path.to_path_buf())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let reversed = *self.reversed.lock().unwrap_or_else(|p| p.into_inner());
        let state = self.lock();
        Self::check_access(&state, path)?;
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                let mut listing: Vec<PathBuf> =
                    children.iter().map(|name| path.join(name)).collect();
                if reversed {
                    listing.reverse();
                }
                Ok(listing)
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_creates_parent_dirs() {
        let fs = MockFileSystem::new();
        fs.add_file("root/a/b.txt", "x");

        assert_eq!(fs.kind(Path::new("root")).unwrap(), EntryKind::Directory);
        assert_eq!(fs.kind(Path::new("root/a")).unwrap(), EntryKind::Directory);
        assert_eq!(
            fs.read_dir(Path::new("root")).unwrap(),
            vec![PathBuf::from("root/a")]
        );
    }

    #[test]
    fn remove_drops_subtree_and_parent_link() {
        let fs = MockFileSystem::new();
        fs.add_file("root/a/b.txt", "x");
        fs.remove("root/a");

        assert_eq!(fs.kind(Path::new("root/a/b.txt")).unwrap(), EntryKind::Missing);
        assert!(fs.read_dir(Path::new("root")).unwrap().is_empty());
    }

    #[test]
    fn denied_paths_fail_reads() {
        let fs = MockFileSystem::new();
        fs.add_file("root/secret", "x");
        fs.deny("root/secret");

        assert!(fs.open_read(Path::new("root/secret")).is_err());
        assert!(fs.kind(Path::new("root/secret")).is_err());
    }
}
