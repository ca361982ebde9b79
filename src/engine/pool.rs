// src/engine/pool.rs

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::errors::{Result, TaskprintError};
use crate::fingerprint::{build_fingerprint, Fingerprint, TaskFingerprints};
use crate::inputs::{PropertyConfiguration, TaskInputs};
use crate::snapshot::SnapshotProvider;

/// Number of workers used when none is configured.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Snapshot and fingerprint one property. Blocking.
pub fn fingerprint_property(
    provider: &dyn SnapshotProvider,
    task: &str,
    config: &PropertyConfiguration,
) -> Result<Fingerprint> {
    let snapshot = match config.root() {
        Some(root) => Some(provider.snapshot(root).map_err(|source| TaskprintError::Snapshot {
            task: task.to_string(),
            property: config.name().to_string(),
            source,
        })?),
        None => None,
    };
    build_fingerprint(task, config, snapshot.as_ref())
}

/// Fingerprints task inputs on a bounded pool of blocking workers.
///
/// Cloning is cheap; clones share the same pool, so the bound holds across
/// every task being checked concurrently.
#[derive(Debug, Clone)]
pub struct FingerprintEngine {
    provider: Arc<dyn SnapshotProvider>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl FingerprintEngine {
    pub fn new(provider: Arc<dyn SnapshotProvider>, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            provider,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Stop handing out workers. Work that has not started yet fails with
    /// [`TaskprintError::Cancelled`]; nothing already running is waited for.
    pub fn cancel(&self) {
        self.permits.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.permits.is_closed()
    }

    /// Fingerprint every property of `inputs`.
    ///
    /// Properties are processed concurrently and joined before returning.
    /// The first failure wins; dropping the returned future abandons all
    /// outstanding work and its results.
    pub async fn fingerprint_task(&self, inputs: &TaskInputs) -> Result<TaskFingerprints> {
        let task = inputs.task().to_string();
        let mut join_set = JoinSet::new();

        for config in inputs.properties().iter().cloned() {
            let provider = Arc::clone(&self.provider);
            let permits = Arc::clone(&self.permits);
            let task = task.clone();

            join_set.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| TaskprintError::Cancelled { task: task.clone() })?;
                debug!(task = %task, property = %config.name(), "fingerprinting property");

                let task_for_err = task.clone();
                tokio::task::spawn_blocking(move || {
                    fingerprint_property(provider.as_ref(), &task, &config)
                })
                .await
                .map_err(|e| {
                    TaskprintError::Other(anyhow::anyhow!(
                        "fingerprint worker for task '{task_for_err}' failed: {e}"
                    ))
                })?
            });
        }

        let mut fingerprints = TaskFingerprints::new();
        while let Some(joined) = join_set.join_next().await {
            let fingerprint = joined.map_err(|e| {
                TaskprintError::Other(anyhow::anyhow!(
                    "fingerprint task for '{task}' failed: {e}"
                ))
            })??;
            fingerprints.insert(fingerprint);
        }

        debug!(task = %task, properties = fingerprints.len(), "all properties fingerprinted");
        Ok(fingerprints)
    }
}
