// src/engine/checker.rs

use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::decision::{
    compare_task, decide, fail_safe, HistoryComparison, TaskExecutionDecision,
};
use crate::engine::pool::FingerprintEngine;
use crate::errors::{Result, TaskprintError};
use crate::fingerprint::{FingerprintStore, TaskFingerprints};
use crate::inputs::TaskInputs;

/// Outcome of checking one task.
#[derive(Debug, Clone)]
pub struct TaskCheck {
    pub task: String,
    pub decision: TaskExecutionDecision,
    /// Fingerprints taken during the check. `None` when fingerprinting
    /// itself failed.
    pub current: Option<TaskFingerprints>,
    /// `None` when no comparison could be made.
    pub comparison: Option<HistoryComparison>,
}

impl TaskCheck {
    pub fn current_fingerprints(&self) -> Option<&TaskFingerprints> {
        self.current.as_ref()
    }
}

/// Decides whether tasks are up to date against a [`FingerprintStore`].
#[derive(Clone)]
pub struct UpToDateChecker {
    engine: FingerprintEngine,
    store: Arc<Mutex<Box<dyn FingerprintStore>>>,
}

impl UpToDateChecker {
    pub fn new(engine: FingerprintEngine, store: Box<dyn FingerprintStore>) -> Self {
        Self {
            engine,
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn engine(&self) -> &FingerprintEngine {
        &self.engine
    }

    /// Check one task.
    ///
    /// Configuration errors and cancellation are returned. Snapshot, store
    /// and comparison failures are logged and turn into an `Execute`
    /// decision.
    pub async fn check(&self, inputs: &TaskInputs, outputs_changed: bool) -> Result<TaskCheck> {
        let task = inputs.task().to_string();

        let current = match self.engine.fingerprint_task(inputs).await {
            Ok(current) => current,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(task = %task, error = %e, "fingerprinting failed; task will execute");
                return Ok(TaskCheck {
                    task,
                    decision: fail_safe(&e),
                    current: None,
                    comparison: None,
                });
            }
        };

        let previous = match self.load(&task) {
            Ok(previous) => previous,
            Err(e) => {
                warn!(
                    task = %task,
                    error = %e,
                    "could not load previous fingerprints; task will execute"
                );
                return Ok(TaskCheck {
                    task,
                    decision: fail_safe(&e),
                    current: Some(current),
                    comparison: None,
                });
            }
        };

        let comparison = match compare_task(&task, previous.as_ref(), &current) {
            Ok(comparison) => comparison,
            Err(e) => {
                warn!(task = %task, error = %e, "fingerprint comparison failed; task will execute");
                return Ok(TaskCheck {
                    task,
                    decision: fail_safe(&e),
                    current: Some(current),
                    comparison: None,
                });
            }
        };

        let decision = decide(&current, &comparison, outputs_changed);
        info!(task = %task, decision = %decision, "up-to-date check finished");

        Ok(TaskCheck {
            task,
            decision,
            current: Some(current),
            comparison: Some(comparison),
        })
    }

    /// Check several tasks concurrently. Results come back in input order.
    ///
    /// The first fatal error aborts the remaining checks.
    pub async fn check_all(
        &self,
        tasks: Vec<Arc<TaskInputs>>,
        outputs_changed: bool,
    ) -> Result<Vec<TaskCheck>> {
        let mut join_set = JoinSet::new();
        for (index, inputs) in tasks.into_iter().enumerate() {
            let checker = self.clone();
            join_set.spawn(async move {
                let check = checker.check(&inputs, outputs_changed).await;
                (index, check)
            });
        }

        let mut results: Vec<Option<TaskCheck>> = Vec::new();
        results.resize_with(join_set.len(), || None);
        while let Some(joined) = join_set.join_next().await {
            let (index, check) = joined.map_err(|e| {
                TaskprintError::Other(anyhow::anyhow!("task check failed to complete: {e}"))
            })?;
            results[index] = Some(check?);
        }

        Ok(results.into_iter().flatten().collect())
    }

    /// Persist the fingerprints taken during `check` as the new history for
    /// its task. Does nothing when no fingerprints were taken.
    pub fn record(&self, check: &TaskCheck) -> Result<()> {
        let Some(current) = check.current_fingerprints() else {
            debug!(task = %check.task, "no fingerprints to record");
            return Ok(());
        };
        let mut store = self.lock_store()?;
        store.save(&check.task, current)?;
        Ok(())
    }

    /// Forget history for tasks not in `active_tasks`.
    pub fn prune(&self, active_tasks: &[&str]) -> Result<()> {
        let mut store = self.lock_store()?;
        store.prune(active_tasks)?;
        Ok(())
    }

    fn load(&self, task: &str) -> Result<Option<TaskFingerprints>> {
        let store = self.lock_store()?;
        Ok(store.load(task)?)
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, Box<dyn FingerprintStore>>> {
        self.store.lock().map_err(|_| {
            TaskprintError::Other(anyhow::anyhow!("fingerprint store mutex poisoned"))
        })
    }
}
