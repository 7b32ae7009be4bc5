//! Task state, the continuation trampoline, and the caller-facing handle.
//!
//! A task body is an explicit continuation: a closure returning a [`Step`].
//! Workers drive the task by taking the continuation out of the shared
//! state and invoking it. `Done`/`Fail` write the result slot; `Yield`
//! hands the next continuation back to the scheduler for another trip
//! through the pool. Because resumption *takes* the continuation, a
//! finished or in-flight task can never be resumed a second time.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::core::error::{TaskError, TaskResult};
use crate::core::slot::ResultSlot;
use crate::core::work::WorkItem;
use crate::core::worker_pool::WorkerPool;

/// Monotonic task ids for tracing.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(0);

/// One resumption step of a task body.
pub enum Step<T> {
    /// The computation finished with a value.
    Done(T),
    /// The computation finished with an error.
    Fail(anyhow::Error),
    /// The computation suspends; resume it later by invoking the
    /// continuation on a worker. The resumed step re-enters the pool at
    /// the back of the FIFO queue.
    Yield(Continuation<T>),
}

/// A resumable computation: invoked at most once, produces the next step.
pub type Continuation<T> = Box<dyn FnOnce() -> Step<T> + Send + 'static>;

/// The shared record backing one task: the resumable computation handle and
/// the single-assignment result slot.
///
/// Shared by `Arc` between every [`TaskHandle`] clone and the in-flight
/// work item; freed when the last reference drops. The continuation slot is
/// empty while a step is running and permanently once the task finishes,
/// so the runtime never resumes a finished computation.
pub(crate) struct TaskState<T> {
    id: u64,
    resume: Mutex<Option<Continuation<T>>>,
    slot: ResultSlot<T>,
}

impl<T> TaskState<T> {
    pub(crate) fn new(first: Continuation<T>) -> Self {
        Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            resume: Mutex::new(Some(first)),
            slot: ResultSlot::new(),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

/// The work-item face of a task: resumes the computation on a worker.
///
/// Exactly one runner exists per task at any moment: the initial one
/// submitted at spawn, then one per `Yield`. If the pool drops a runner
/// without executing it (shutdown, or submission rejected), the drop path
/// invalidates the continuation and fails the slot with
/// [`TaskError::Shutdown`] so retrievals fail fast instead of blocking
/// forever.
pub(crate) struct TaskRunner<T> {
    state: Arc<TaskState<T>>,
    pool: Weak<WorkerPool>,
    ran: bool,
}

impl<T> TaskRunner<T> {
    pub(crate) fn new(state: Arc<TaskState<T>>, pool: Weak<WorkerPool>) -> Self {
        Self {
            state,
            pool,
            ran: false,
        }
    }
}

impl<T: Send + 'static> WorkItem for TaskRunner<T> {
    fn execute(mut self: Box<Self>) {
        self.ran = true;
        let task_id = self.state.id();

        // Taking the continuation is what makes double-resume impossible:
        // a finished task has nothing left to take.
        let Some(resume) = self.state.resume.lock().take() else {
            error!(task_id, "task resumed with no pending continuation");
            return;
        };

        match catch_unwind(AssertUnwindSafe(resume)) {
            Ok(Step::Done(value)) => {
                debug!(task_id, "task completed");
                self.state.slot.fulfill(Ok(value));
            }
            Ok(Step::Fail(err)) => {
                debug!(task_id, "task failed");
                self.state.slot.fulfill(Err(TaskError::from(err)));
            }
            Ok(Step::Yield(next)) => {
                debug!(task_id, "task yielded");
                let Some(pool) = self.pool.upgrade() else {
                    // Pool is gone; treat the pending resumption like any
                    // other abandoned work item.
                    self.state.slot.fulfill(Err(TaskError::Shutdown));
                    return;
                };
                *self.state.resume.lock() = Some(next);
                let runner = Self::new(Arc::clone(&self.state), Weak::clone(&self.pool));
                // A rejected resubmission drops the runner, which fails the
                // slot through the drop path below.
                let _ = pool.submit(runner);
            }
            Err(panic) => {
                debug!(task_id, "task panicked");
                self.state.slot.fulfill(Err(TaskError::from_panic(panic)));
            }
        }
    }
}

impl<T> Drop for TaskRunner<T> {
    fn drop(&mut self) {
        if self.ran {
            return;
        }
        // Dropped unexecuted: the pool abandoned this item. Invalidate the
        // continuation so it can never run, and fail waiting retrievers.
        self.state.resume.lock().take();
        if !self.state.slot.is_set() {
            debug!(task_id = self.state.id(), "task abandoned before running");
            self.state.slot.fulfill(Err(TaskError::Shutdown));
        }
    }
}

/// Caller-facing, cloneable reference to a task's eventual outcome.
///
/// Any number of handles may exist; each can retrieve the result
/// independently and all observe the identical outcome. The handle is the
/// only synchronization surface exposed to user code; callers never touch
/// the pool or its queue directly.
pub struct TaskHandle<T> {
    state: Arc<TaskState<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(state: Arc<TaskState<T>>) -> Self {
        Self { state }
    }

    /// Identifier of the underlying task (unique per process).
    #[must_use]
    pub fn id(&self) -> u64 {
        self.state.id()
    }

    /// Whether the task has finished (successfully or not).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.slot.is_set()
    }
}

impl<T: Clone> TaskHandle<T> {
    /// Block the calling thread until the task finishes, then return its
    /// outcome.
    ///
    /// Reads are idempotent: the slot is not consumed, and every caller,
    /// on any thread, from any clone of the handle, gets the same value
    /// or the same failure.
    ///
    /// Calling this from inside another task's body blocks that worker
    /// thread for the duration; deep nesting reduces effective concurrency.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskError`] captured from the task body, or
    /// [`TaskError::Shutdown`] if the pool abandoned the task.
    pub fn result(&self) -> TaskResult<T> {
        self.state.slot.wait()
    }

    /// Non-blocking probe for the outcome.
    #[must_use]
    pub fn try_result(&self) -> Option<TaskResult<T>> {
        self.state.slot.try_get()
    }

    /// Block up to `timeout` for the outcome; `None` if the task is still
    /// running when the timeout elapses.
    #[must_use]
    pub fn result_timeout(&self, timeout: Duration) -> Option<TaskResult<T>> {
        self.state.slot.wait_timeout(timeout)
    }
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}
