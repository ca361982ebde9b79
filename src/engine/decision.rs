// src/engine/decision.rs

use std::fmt;

use crate::errors::{Result, TaskprintError};
use crate::fingerprint::{compare, PropertyComparison, TaskFingerprints};

/// Why a task may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Every `skip_when_empty` property is empty.
    NoSourceInputs,
    /// Nothing changed since the last successful execution.
    UpToDate,
}

/// Why a task has to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteReason {
    /// No fingerprints were recorded for this task yet.
    NoHistory,
    /// These input properties changed (including properties that were
    /// added or removed since the last execution).
    InputsChanged { properties: Vec<String> },
    OutputsChanged,
    /// The up-to-date check itself failed; executing is the safe choice.
    CheckFailed { cause: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskExecutionDecision {
    Execute(ExecuteReason),
    Skip(SkipReason),
}

impl TaskExecutionDecision {
    pub fn should_execute(&self) -> bool {
        matches!(self, TaskExecutionDecision::Execute(_))
    }
}

impl fmt::Display for TaskExecutionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskExecutionDecision::Skip(SkipReason::NoSourceInputs) => {
                f.write_str("SKIP (no source inputs)")
            }
            TaskExecutionDecision::Skip(SkipReason::UpToDate) => f.write_str("SKIP (up to date)"),
            TaskExecutionDecision::Execute(ExecuteReason::NoHistory) => {
                f.write_str("EXECUTE (no previous fingerprints)")
            }
            TaskExecutionDecision::Execute(ExecuteReason::InputsChanged { properties }) => {
                write!(f, "EXECUTE (inputs changed: {})", properties.join(", "))
            }
            TaskExecutionDecision::Execute(ExecuteReason::OutputsChanged) => {
                f.write_str("EXECUTE (outputs changed)")
            }
            TaskExecutionDecision::Execute(ExecuteReason::CheckFailed { cause }) => {
                write!(f, "EXECUTE (up-to-date check failed: {cause})")
            }
        }
    }
}

/// Result of comparing a task's current fingerprints with its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryComparison {
    NoHistory,
    Compared {
        /// One comparison per property present in both builds, by name.
        properties: Vec<PropertyComparison>,
        /// Declared now, absent from history.
        added: Vec<String>,
        /// Present in history, no longer declared.
        removed: Vec<String>,
    },
}

impl HistoryComparison {
    /// Names of everything that changed, sorted.
    pub fn changed_properties(&self) -> Vec<String> {
        match self {
            HistoryComparison::NoHistory => Vec::new(),
            HistoryComparison::Compared {
                properties,
                added,
                removed,
            } => {
                let mut changed: Vec<String> = properties
                    .iter()
                    .filter(|c| !c.is_unchanged())
                    .map(|c| c.property_name().to_string())
                    .chain(added.iter().cloned())
                    .chain(removed.iter().cloned())
                    .collect();
                changed.sort();
                changed
            }
        }
    }
}

/// Compare every property of `current` with `previous`.
///
/// A stored fingerprint whose own property name disagrees with the name it
/// was stored under surfaces as [`TaskprintError::Comparison`].
pub fn compare_task(
    task: &str,
    previous: Option<&TaskFingerprints>,
    current: &TaskFingerprints,
) -> Result<HistoryComparison> {
    let Some(previous) = previous else {
        return Ok(HistoryComparison::NoHistory);
    };

    let mut properties = Vec::new();
    let mut added = Vec::new();
    for (name, fingerprint) in current.iter() {
        match previous.get(name) {
            Some(old) => properties.push(compare(task, old, fingerprint)?),
            None => added.push(name.to_string()),
        }
    }

    let removed = previous
        .property_names()
        .filter(|name| current.get(name).is_none())
        .map(str::to_string)
        .collect();

    Ok(HistoryComparison::Compared {
        properties,
        added,
        removed,
    })
}

/// Fold a task's fingerprints and history comparison into one decision.
///
/// The no-source check runs first: if the task has at least one
/// `skip_when_empty` property and all of them are empty, the task is skipped
/// whatever else changed.
pub fn decide(
    current: &TaskFingerprints,
    history: &HistoryComparison,
    outputs_changed: bool,
) -> TaskExecutionDecision {
    let mut sources = current.fingerprints().filter(|f| f.skip_when_empty()).peekable();
    if sources.peek().is_some() && sources.all(|f| f.is_empty()) {
        return TaskExecutionDecision::Skip(SkipReason::NoSourceInputs);
    }

    if let HistoryComparison::NoHistory = history {
        return TaskExecutionDecision::Execute(ExecuteReason::NoHistory);
    }

    let changed = history.changed_properties();
    if !changed.is_empty() {
        return TaskExecutionDecision::Execute(ExecuteReason::InputsChanged { properties: changed });
    }

    if outputs_changed {
        return TaskExecutionDecision::Execute(ExecuteReason::OutputsChanged);
    }

    TaskExecutionDecision::Skip(SkipReason::UpToDate)
}

/// Decision used when the check could not be completed.
pub fn fail_safe(error: &TaskprintError) -> TaskExecutionDecision {
    TaskExecutionDecision::Execute(ExecuteReason::CheckFailed {
        cause: error.to_string(),
    })
}
