//! # Tasklot
//!
//! A minimal cooperative-task runtime: computations expressed as suspendable
//! tasks, executed on a fixed pool of worker threads, observed through
//! cloneable shared-future handles.
//!
//! The runtime is deliberately small. There is no reactor, no timer wheel,
//! no work stealing: just the pieces needed to take a computation off the
//! calling thread and hand its result back.
//!
//! - **[`WorkItem`]**: an atomic, synchronous, once-executable unit of work.
//! - **[`WorkerPool`]**: a fixed set of OS threads draining one FIFO queue,
//!   blocking (not spinning) when idle.
//! - **Task state + result slot**: a shared, reference-counted record per
//!   task holding the resumable computation and a single-assignment outcome
//!   cell that any number of readers can block on.
//! - **[`Scheduler`]**: the glue that wraps "resume this task" as a work
//!   item and submits it to the pool, at spawn time and again whenever a
//!   task body yields.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tasklot::{PoolConfig, Scheduler, WorkerPool};
//!
//! let pool = Arc::new(WorkerPool::new(PoolConfig::default()).unwrap());
//! let scheduler = Scheduler::new(Arc::clone(&pool));
//!
//! let task = scheduler.spawn(|| 3 + 4);
//! assert_eq!(task.result().unwrap(), 7);
//!
//! // Handles are cheap clones; every holder observes the same outcome.
//! let other = task.clone();
//! assert_eq!(other.result().unwrap(), 7);
//!
//! pool.shutdown();
//! ```
//!
//! ## Failure model
//!
//! A panic or an explicit error inside a task body is captured into that
//! task's result slot and surfaced as a [`TaskError`] to every retriever.
//! One task's failure never affects sibling tasks or the pool itself.
//!
//! ## Shutdown
//!
//! [`WorkerPool::shutdown`] stops the pool: workers mid-execution finish
//! their current item, queued items are abandoned, and handles backed by an
//! abandoned item resolve to [`TaskError::Shutdown`] rather than blocking
//! forever.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

/// Core runtime: work items, the worker pool, task state, and the scheduler.
pub mod core;
/// Configuration models for the worker pool.
pub mod config;
/// Shared utilities.
pub mod util;

pub use crate::config::PoolConfig;
pub use crate::core::{
    Continuation, PoolError, PoolStats, Scheduler, Step, TaskError, TaskHandle, WorkItem,
    WorkerPool,
};
