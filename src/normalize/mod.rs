// src/normalize/mod.rs

//! Normalization of raw snapshots into comparable entries.
//!
//! A normalizer turns a [`Snapshot`] into `(key, content hash)` pairs. The
//! key keeps as much of an entry's location as the property's
//! [`PathSensitivity`] allows, so that differences the property does not care
//! about (absolute location, directory layout, file names) disappear.
//!
//! Built-in strategies live in [`builtin`]. Anything else can be plugged in
//! by implementing [`FileNormalizer`] and registering it in a
//! [`NormalizerRegistry`].

pub mod builtin;
pub mod registry;

use std::fmt::{self, Debug};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::snapshot::{ContentHash, Snapshot};
use crate::types::PathSensitivity;

pub use builtin::BuiltinNormalizer;
pub use registry::NormalizerRegistry;

/// One normalized `(key, content)` pair.
///
/// Ordering is by key, then by content hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NormalizedEntry {
    pub key: String,
    pub content_hash: ContentHash,
}

impl NormalizedEntry {
    pub fn new(key: impl Into<String>, content_hash: ContentHash) -> Self {
        Self {
            key: key.into(),
            content_hash,
        }
    }

    /// Entries with an empty key carry no location at all; only their
    /// content identifies them.
    pub fn is_path_free(&self) -> bool {
        self.key.is_empty()
    }

    pub fn is_empty_directory(&self) -> bool {
        self.content_hash.is_empty_directory()
    }
}

impl fmt::Display for NormalizedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.key.is_empty() { "<content>" } else { &self.key };
        if self.is_empty_directory() {
            write!(f, "{key} (empty directory)")
        } else {
            write!(f, "{key} ({})", self.content_hash.short())
        }
    }
}

/// Pluggable normalization strategy.
///
/// Implementations must be pure: the same snapshot and sensitivity always
/// produce the same entries. Returned entries need not be sorted or unique;
/// the fingerprint builder canonicalizes them.
pub trait FileNormalizer: Send + Sync + Debug {
    /// Identifier used to select this normalizer in configuration.
    fn id(&self) -> &str;

    fn normalize(&self, snapshot: &Snapshot, sensitivity: PathSensitivity) -> Vec<NormalizedEntry>;
}

/// Normalizer selected for a property: a built-in strategy or a custom one.
#[derive(Debug, Clone)]
pub enum Normalizer {
    Builtin(BuiltinNormalizer),
    Custom(Arc<dyn FileNormalizer>),
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::Builtin(BuiltinNormalizer::Default)
    }
}

impl Normalizer {
    pub fn id(&self) -> &str {
        match self {
            Normalizer::Builtin(builtin) => builtin.id(),
            Normalizer::Custom(custom) => custom.id(),
        }
    }

    pub fn normalize(
        &self,
        snapshot: &Snapshot,
        sensitivity: PathSensitivity,
    ) -> Vec<NormalizedEntry> {
        match self {
            Normalizer::Builtin(builtin) => builtin.normalize(snapshot, sensitivity),
            Normalizer::Custom(custom) => custom.normalize(snapshot, sensitivity),
        }
    }
}
