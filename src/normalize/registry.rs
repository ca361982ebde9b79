// src/normalize/registry.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::debug;

use crate::normalize::{BuiltinNormalizer, FileNormalizer, Normalizer};

/// Lookup table from normalizer id to implementation.
///
/// Built-in ids always resolve; custom normalizers are added with
/// [`NormalizerRegistry::register`].
#[derive(Debug, Clone, Default)]
pub struct NormalizerRegistry {
    custom: BTreeMap<String, Arc<dyn FileNormalizer>>,
}

impl NormalizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom normalizer under its own id.
    ///
    /// Built-in ids cannot be shadowed; registering the same custom id twice
    /// replaces the earlier normalizer.
    pub fn register(&mut self, normalizer: Arc<dyn FileNormalizer>) -> Result<()> {
        let id = normalizer.id().to_string();
        if BuiltinNormalizer::from_id(&id).is_some() {
            bail!("normalizer id '{id}' is reserved for a built-in normalizer");
        }
        if id.trim().is_empty() {
            bail!("normalizer id must not be empty");
        }
        debug!(normalizer = %id, "registered custom normalizer");
        self.custom.insert(id, normalizer);
        Ok(())
    }

    pub fn resolve(&self, id: &str) -> Option<Normalizer> {
        if let Some(builtin) = BuiltinNormalizer::from_id(id) {
            return Some(Normalizer::Builtin(builtin));
        }
        self.custom.get(id).cloned().map(Normalizer::Custom)
    }

    /// All ids that [`resolve`](Self::resolve) accepts, built-ins first.
    pub fn ids(&self) -> Vec<String> {
        BuiltinNormalizer::ALL
            .iter()
            .map(|b| b.id().to_string())
            .chain(self.custom.keys().cloned())
            .collect()
    }
}
