//! Error types for pool and task operations.

use std::sync::Arc;

use thiserror::Error;

/// Outcome of a task as observed through its handle.
///
/// Cloned out of the task's result slot on every read, so any number of
/// handle holders observe the identical outcome.
pub type TaskResult<T> = Result<T, TaskError>;

/// Failure of a single task, captured into its result slot and surfaced to
/// every retriever.
///
/// Task failures are isolated: one task failing never affects sibling tasks
/// or the pool. The payload is reference-counted so the same failure can be
/// handed to all readers of a shared handle.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// The task body panicked; the panic message is preserved.
    #[error("task panicked: {0}")]
    Panicked(Arc<String>),
    /// The task body returned an error.
    #[error("task failed: {0}")]
    Failed(Arc<anyhow::Error>),
    /// The task was abandoned before it could run because the pool shut
    /// down. Retrieval fails with this instead of blocking forever.
    #[error("pool shut down before the task could run")]
    Shutdown,
}

impl TaskError {
    /// Wrap a panic payload, keeping the message when it is a string.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        Self::Panicked(Arc::new(msg))
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(Arc::new(err))
    }
}

/// Errors produced by the worker pool API.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool has been shut down; no further work is accepted.
    #[error("pool has been shut down")]
    Shutdown,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
