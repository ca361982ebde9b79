// src/errors.rs

//! Crate-wide error type.
//!
//! Low-level layers (filesystem, snapshot walking, stores) work with
//! `anyhow::Result` and attach context; the engine lifts failures into
//! [`TaskprintError`] variants that always name the task and property.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskprintError {
    /// A required property has no usable root, or the root has the wrong kind.
    #[error("configuration error in task '{task}', property '{property}': {reason}")]
    Configuration {
        task: String,
        property: String,
        reason: String,
    },

    /// A configuration mutator was called after the task was frozen.
    #[error("configuration of task '{task}' is frozen; cannot modify property '{property}'")]
    FrozenConfiguration { task: String, property: String },

    /// Two fingerprints for different properties were compared.
    #[error(
        "cannot compare fingerprints in task '{task}': expected property '{expected}', got '{actual}'"
    )]
    Comparison {
        task: String,
        expected: String,
        actual: String,
    },

    /// Reading the filesystem failed while snapshotting a property root.
    #[error("failed to snapshot task '{task}', property '{property}': {source:#}")]
    Snapshot {
        task: String,
        property: String,
        #[source]
        source: anyhow::Error,
    },

    /// Fingerprinting was abandoned before it finished.
    #[error("fingerprinting of task '{task}' was cancelled")]
    Cancelled { task: String },

    #[error("Config file error: {0}")]
    ConfigFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskprintError {
    /// Whether this error should abort the build for the owning task rather
    /// than fall back to executing it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TaskprintError::Configuration { .. }
                | TaskprintError::FrozenConfiguration { .. }
                | TaskprintError::Cancelled { .. }
                | TaskprintError::ConfigFile(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskprintError>;
