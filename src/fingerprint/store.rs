// src/fingerprint/store.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fingerprint::TaskFingerprints;
use crate::fs::FileSystem;
use crate::types::EntryKind;

/// Relative path (from the project root) to the fingerprint file.
pub const STORE_FILE_PATH: &str = ".taskprint/fingerprints.json";

const STORE_FORMAT_VERSION: u32 = 1;

/// Abstract storage for the fingerprints of the last successful execution
/// of each task.
pub trait FingerprintStore: Send + Sync {
    fn load(&self, task: &str) -> Result<Option<TaskFingerprints>>;
    fn save(&mut self, task: &str, fingerprints: &TaskFingerprints) -> Result<()>;
    /// Remove fingerprints for tasks that are not in the `active_tasks` list.
    fn prune(&mut self, active_tasks: &[&str]) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    tasks: BTreeMap<String, TaskFingerprints>,
}

impl StoreFile {
    fn empty() -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            tasks: BTreeMap::new(),
        }
    }
}

/// Stores fingerprints as JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileFingerprintStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileFingerprintStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Store at `<root>/.taskprint/fingerprints.json`.
    pub fn in_root(fs: Arc<dyn FileSystem>, root: &Path) -> Self {
        Self::new(fs, root.join(STORE_FILE_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> Result<StoreFile> {
        if self.fs.kind(&self.path)? == EntryKind::Missing {
            return Ok(StoreFile::empty());
        }

        let contents = self.fs.read_to_string(&self.path)?;
        let file: StoreFile = serde_json::from_str(&contents)
            .with_context(|| format!("parsing fingerprint store at {:?}", self.path))?;
        if file.version != STORE_FORMAT_VERSION {
            anyhow::bail!(
                "fingerprint store at {:?} has version {}, expected {}",
                self.path,
                file.version,
                STORE_FORMAT_VERSION
            );
        }
        Ok(file)
    }

    /// Current contents for a read-modify-write. A store that cannot be
    /// parsed (corrupt, or another format version) is started over, so the
    /// next save repairs it.
    fn load_for_update(&self) -> Result<StoreFile> {
        if self.fs.kind(&self.path)? == EntryKind::Missing {
            return Ok(StoreFile::empty());
        }
        match self.load_all() {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!(
                    path = ?self.path,
                    error = %format!("{e:#}"),
                    "discarding unreadable fingerprint store"
                );
                Ok(StoreFile::empty())
            }
        }
    }

    fn save_all(&self, file: &StoreFile) -> Result<()> {
        let json = serde_json::to_string_pretty(file).context("serializing fingerprint store")?;
        self.fs
            .write(&self.path, json.as_bytes())
            .with_context(|| format!("writing fingerprint store at {:?}", self.path))
    }
}

impl FingerprintStore for FileFingerprintStore {
    fn load(&self, task: &str) -> Result<Option<TaskFingerprints>> {
        let mut file = self.load_all()?;
        Ok(file.tasks.remove(task))
    }

    fn save(&mut self, task: &str, fingerprints: &TaskFingerprints) -> Result<()> {
        let mut file = self.load_for_update()?;
        file.tasks.insert(task.to_string(), fingerprints.clone());
        self.save_all(&file)?;
        info!(task = %task, properties = fingerprints.len(), "stored task fingerprints (file)");
        Ok(())
    }

    fn prune(&mut self, active_tasks: &[&str]) -> Result<()> {
        let mut file = self.load_for_update()?;
        let initial_len = file.tasks.len();
        file.tasks.retain(|k, _| active_tasks.contains(&k.as_str()));

        if file.tasks.len() < initial_len {
            self.save_all(&file)?;
            info!(
                removed = initial_len - file.tasks.len(),
                "pruned stale task fingerprints (file)"
            );
        }
        Ok(())
    }
}

/// Stores fingerprints in memory only.
#[derive(Debug, Default)]
pub struct MemoryFingerprintStore {
    map: BTreeMap<String, TaskFingerprints>,
}

impl MemoryFingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FingerprintStore for MemoryFingerprintStore {
    fn load(&self, task: &str) -> Result<Option<TaskFingerprints>> {
        Ok(self.map.get(task).cloned())
    }

    fn save(&mut self, task: &str, fingerprints: &TaskFingerprints) -> Result<()> {
        self.map.insert(task.to_string(), fingerprints.clone());
        info!(task = %task, properties = fingerprints.len(), "stored task fingerprints (memory)");
        Ok(())
    }

    fn prune(&mut self, active_tasks: &[&str]) -> Result<()> {
        let initial_len = self.map.len();
        self.map.retain(|k, _| active_tasks.contains(&k.as_str()));
        if self.map.len() < initial_len {
            info!(
                removed = initial_len - self.map.len(),
                "pruned stale task fingerprints (memory)"
            );
        }
        Ok(())
    }
}
