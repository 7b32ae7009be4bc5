//! The scheduler adapter: converts a task's suspension into pool work.
//!
//! Spawning a task never runs its body on the spawning thread. The
//! scheduler creates the task state, wraps "resume this computation" as a
//! work item, and submits it to the pool immediately; the same path carries
//! every later resumption when a task body yields.

use std::sync::Arc;

use tracing::debug;

use crate::core::task::{Continuation, Step, TaskHandle, TaskRunner, TaskState};
use crate::core::worker_pool::WorkerPool;

/// Bridges task computations onto a [`WorkerPool`].
///
/// The pool is caller-constructed and passed in by `Arc`: build one at
/// startup, share it with everything that spawns tasks. Schedulers are
/// cheap; any number may front the same pool.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tasklot::{PoolConfig, Scheduler, WorkerPool};
///
/// let pool = Arc::new(WorkerPool::new(PoolConfig::default()).unwrap());
/// let scheduler = Scheduler::new(Arc::clone(&pool));
///
/// let sum = scheduler.spawn(|| 3 + 4);
/// assert_eq!(sum.result().unwrap(), 7);
/// # pool.shutdown();
/// ```
#[derive(Clone)]
pub struct Scheduler {
    pool: Arc<WorkerPool>,
}

impl Scheduler {
    /// Create a scheduler fronting the given pool.
    #[must_use]
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self { pool }
    }

    /// The pool this scheduler submits to.
    #[must_use]
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Spawn a task from a plain body. The returned handle is available
    /// immediately; the body runs on a worker thread.
    ///
    /// A panic inside the body is captured into the task's outcome.
    pub fn spawn<T, F>(&self, body: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.spawn_steps(Box::new(move || Step::Done(body())))
    }

    /// Spawn a task whose body may fail. An `Err` becomes
    /// [`TaskError::Failed`](crate::TaskError::Failed) in the task outcome.
    pub fn spawn_fallible<T, F>(&self, body: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        self.spawn_steps(Box::new(move || match body() {
            Ok(value) => Step::Done(value),
            Err(err) => Step::Fail(err),
        }))
    }

    /// Spawn a multi-step task from its first continuation.
    ///
    /// Each [`Step::Yield`] re-enters the pool as a fresh work item at the
    /// back of the FIFO queue, so a resumed task queues behind work
    /// submitted in the meantime.
    ///
    /// If the pool has already shut down, the handle resolves to
    /// [`TaskError::Shutdown`](crate::TaskError::Shutdown) instead of
    /// blocking its holders forever.
    pub fn spawn_steps<T>(&self, first: Continuation<T>) -> TaskHandle<T>
    where
        T: Send + 'static,
    {
        let state = Arc::new(TaskState::new(first));
        let handle = TaskHandle::new(Arc::clone(&state));
        debug!(task_id = handle.id(), "task spawned");

        let runner = TaskRunner::new(state, Arc::downgrade(&self.pool));
        // Rejection drops the runner, which resolves the handle to a
        // shutdown failure.
        let _ = self.pool.submit(runner);

        handle
    }
}
