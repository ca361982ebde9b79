// src/engine/mod.rs

//! Up-to-date checking.
//!
//! - [`pool`] fingerprints every property of a task on a bounded pool of
//!   blocking workers and joins the results.
//! - [`decision`] compares against history and folds everything into a
//!   single [`TaskExecutionDecision`]. It performs no IO.
//! - [`checker`] wires the two together with a [`FingerprintStore`] and
//!   applies the fail-safe rules: anything that goes wrong short of a
//!   configuration error makes the task execute.
//!
//! [`FingerprintStore`]: crate::fingerprint::FingerprintStore

pub mod checker;
pub mod decision;
pub mod pool;

pub use checker::{TaskCheck, UpToDateChecker};
pub use decision::{
    compare_task, decide, fail_safe, ExecuteReason, HistoryComparison, SkipReason,
    TaskExecutionDecision,
};
pub use pool::{default_workers, fingerprint_property, FingerprintEngine};
