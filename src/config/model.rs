// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::errors::Result;
use crate::fingerprint::STORE_FILE_PATH;
use crate::inputs::{InputRegistry, TaskInputs};
use crate::normalize::NormalizerRegistry;
use crate::types::{InputKind, PathSensitivity, StoreMode};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// workers = 4
/// store = "file"
///
/// [task.compile.inputs.sources]
/// root = "src"
/// path_sensitivity = "relative"
/// skip_when_empty = true
/// include = ["**/*.rs"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration. Built through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    /// Wrap an already validated configuration.
    pub(crate) fn new_unchecked(config: ConfigSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { config, task }
    }

    /// Declare and freeze the inputs of every task.
    ///
    /// Relative roots are resolved against `base_dir`. Tasks come back in
    /// name order.
    pub fn task_inputs(
        &self,
        base_dir: &Path,
        normalizers: NormalizerRegistry,
    ) -> Result<Vec<Arc<TaskInputs>>> {
        let mut registry = InputRegistry::new(normalizers);

        for (task_name, task) in &self.task {
            for (property, input) in &task.inputs {
                let handle = registry.declare_property(task_name, property)?;
                if let Some(root) = &input.root {
                    registry.from(&handle, resolve_root(base_dir, root))?;
                }
                registry.kind(&handle, input.kind)?;
                registry.with_path_sensitivity(&handle, input.path_sensitivity)?;
                if let Some(id) = &input.normalizer {
                    registry.with_normalizer(&handle, id)?;
                }
                for pattern in &input.include {
                    registry.include(&handle, pattern)?;
                }
                for pattern in &input.exclude {
                    registry.exclude(&handle, pattern)?;
                }
                registry.optional(&handle, input.optional)?;
                registry.skip_when_empty(&handle, input.skip_when_empty)?;
            }
        }

        self.task
            .keys()
            .map(|task_name| registry.freeze(task_name))
            .collect()
    }

    /// Fingerprint store location, resolved against `base_dir`.
    pub fn store_path(&self, base_dir: &Path) -> PathBuf {
        resolve_root(base_dir, &self.config.store_path)
    }
}

fn resolve_root(base_dir: &Path, root: &Path) -> PathBuf {
    if root.is_absolute() {
        root.to_path_buf()
    } else {
        base_dir.join(root)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Size of the fingerprinting worker pool. `None` means one worker per
    /// available CPU.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Where fingerprints of previous executions are kept.
    #[serde(default)]
    pub store: StoreMode,

    /// File used when `store = "file"`; relative to the config file.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(STORE_FILE_PATH)
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            workers: None,
            store: StoreMode::default(),
            store_path: default_store_path(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Input properties from `[task.<name>.inputs.<property>]`.
    #[serde(default)]
    pub inputs: BTreeMap<String, InputConfig>,
}

/// `[task.<name>.inputs.<property>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// File or directory the property reads. Only optional properties may
    /// leave it out.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default)]
    pub kind: InputKind,

    #[serde(default)]
    pub path_sensitivity: PathSensitivity,

    /// Normalizer id; `None` selects the default normalizer.
    #[serde(default)]
    pub normalizer: Option<String>,

    #[serde(default)]
    pub optional: bool,

    /// Skip the task when this property (and every other such property) is
    /// empty.
    #[serde(default)]
    pub skip_when_empty: bool,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}
