// src/inputs/property.rs

use std::path::{Path, PathBuf};

use crate::normalize::Normalizer;
use crate::snapshot::PatternFilter;
use crate::types::{InputKind, PathSensitivity};

/// Frozen configuration of one input property.
///
/// Only [`TaskInputsBuilder::freeze`](crate::inputs::TaskInputsBuilder::freeze)
/// creates these, after validation.
#[derive(Debug, Clone)]
pub struct PropertyConfiguration {
    pub(crate) name: String,
    pub(crate) root: Option<PathBuf>,
    pub(crate) kind: InputKind,
    pub(crate) path_sensitivity: PathSensitivity,
    pub(crate) normalizer: Normalizer,
    pub(crate) filter: PatternFilter,
    pub(crate) optional: bool,
    pub(crate) skip_when_empty: bool,
}

impl PropertyConfiguration {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared root; only optional properties may leave it unset.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn path_sensitivity(&self) -> PathSensitivity {
        self.path_sensitivity
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn filter(&self) -> &PatternFilter {
        &self.filter
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn skip_when_empty(&self) -> bool {
        self.skip_when_empty
    }
}

/// Frozen input declarations of one task, in declaration order.
#[derive(Debug, Clone)]
pub struct TaskInputs {
    pub(crate) task: String,
    pub(crate) properties: Vec<PropertyConfiguration>,
}

impl TaskInputs {
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn properties(&self) -> &[PropertyConfiguration] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyConfiguration> {
        self.properties.iter().find(|p| p.name == name)
    }
}
