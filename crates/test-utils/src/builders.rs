#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use taskprint::config::{ConfigFile, ConfigSection, InputConfig, RawConfigFile, TaskConfig};
use taskprint::types::{InputKind, PathSensitivity, StoreMode};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.config.workers = Some(workers);
        self
    }

    pub fn with_memory_store(mut self) -> Self {
        self.config.config.store = StoreMode::Memory;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn input(mut self, name: &str, input: InputConfig) -> Self {
        self.task.inputs.insert(name.to_string(), input);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

impl Default for TaskConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `InputConfig`.
pub struct InputConfigBuilder {
    input: InputConfig,
}

impl InputConfigBuilder {
    pub fn new(root: &str) -> Self {
        Self {
            input: InputConfig {
                root: Some(PathBuf::from(root)),
                ..InputConfig::default()
            },
        }
    }

    /// Optional input without a root.
    pub fn rootless() -> Self {
        Self {
            input: InputConfig {
                optional: true,
                ..InputConfig::default()
            },
        }
    }

    pub fn kind(mut self, kind: InputKind) -> Self {
        self.input.kind = kind;
        self
    }

    pub fn sensitivity(mut self, sensitivity: PathSensitivity) -> Self {
        self.input.path_sensitivity = sensitivity;
        self
    }

    pub fn normalizer(mut self, id: &str) -> Self {
        self.input.normalizer = Some(id.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.input.optional = true;
        self
    }

    pub fn skip_when_empty(mut self) -> Self {
        self.input.skip_when_empty = true;
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.input.include.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.input.exclude.push(pattern.to_string());
        self
    }

    pub fn build(self) -> InputConfig {
        self.input
    }
}
