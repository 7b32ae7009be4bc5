//! Fixed-size worker pool draining a shared FIFO queue of work items.
//!
//! The pool owns the queue and the synchronization guarding it: one
//! `parking_lot::Mutex` around the queue plus stop flag, and one pool-wide
//! `parking_lot::Condvar` for wake-ups. Idle workers block on the condvar;
//! submission wakes exactly one of them. Items are executed outside the
//! queue lock so one long-running item cannot serialize the whole pool.
//!
//! Shutdown stops the pool: blocked workers wake promptly, a worker
//! mid-execution finishes its current item, and items still queued are
//! dropped unexecuted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::config::PoolConfig;
use crate::core::error::PoolError;
use crate::core::work::WorkItem;

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,
    /// Items currently waiting in the queue.
    pub queued_items: usize,
    /// Total items accepted by `submit`.
    pub submitted_items: u64,
    /// Total items executed to completion by workers.
    pub executed_items: u64,
    /// Items dropped unexecuted at shutdown.
    pub abandoned_items: u64,
}

/// Internal counters for pool statistics (lock-free).
#[derive(Debug, Default)]
struct PoolCounters {
    submitted_items: AtomicU64,
    executed_items: AtomicU64,
    abandoned_items: AtomicU64,
}

/// Queue and stop flag, only ever touched while the pool mutex is held.
struct PoolState {
    queue: VecDeque<Box<dyn WorkItem>>,
    stopping: bool,
}

/// State shared between the pool handle and its worker threads.
struct PoolShared {
    state: Mutex<PoolState>,
    work_available: Condvar,
    counters: PoolCounters,
}

/// A fixed set of worker threads consuming a shared FIFO queue of
/// [`WorkItem`]s.
///
/// The worker count is fixed at construction; there is no resizing,
/// backpressure, or priority scheduling. Construct one pool at startup and
/// share it by `Arc` with whatever spawns tasks.
///
/// # Example
///
/// ```rust
/// use tasklot::{PoolConfig, WorkerPool};
///
/// let pool = WorkerPool::new(PoolConfig::default().with_worker_count(2)).unwrap();
/// pool.submit(|| println!("ran on a worker")).unwrap();
/// pool.shutdown();
/// ```
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl WorkerPool {
    /// Create a pool and spawn its worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                stopping: false,
            }),
            work_available: Condvar::new(),
            counters: PoolCounters::default(),
        });

        let mut workers = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("{}-{worker_id}", config.thread_name_prefix))
                .stack_size(config.thread_stack_size)
                .spawn(move || worker_loop(&shared, worker_id))
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }

        info!(
            worker_count = config.worker_count,
            "worker pool initialized"
        );

        Ok(Self {
            shared,
            workers: Mutex::new(workers),
            worker_count: config.worker_count,
        })
    }

    /// Enqueue a work item and wake one waiting worker.
    ///
    /// O(1) beyond the queue mutex; never blocks the submitter. Items are
    /// serviced in submission order relative to the single shared queue,
    /// though with more than one worker no global execution order across
    /// items is implied.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Shutdown`] once shutdown has begun; the item is
    /// dropped without executing.
    pub fn submit<W: WorkItem>(&self, item: W) -> Result<(), PoolError> {
        self.submit_boxed(Box::new(item))
    }

    /// Type-erased form of [`submit`](Self::submit).
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Shutdown`] once shutdown has begun.
    pub fn submit_boxed(&self, item: Box<dyn WorkItem>) -> Result<(), PoolError> {
        {
            let mut state = self.shared.state.lock();
            if state.stopping {
                return Err(PoolError::Shutdown);
            }
            state.queue.push_back(item);
        }
        self.shared
            .counters
            .submitted_items
            .fetch_add(1, Ordering::Relaxed);
        self.shared.work_available.notify_one();
        Ok(())
    }

    /// Number of worker threads in this pool.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Snapshot of pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let queued_items = self.shared.state.lock().queue.len();
        PoolStats {
            worker_count: self.worker_count,
            queued_items,
            submitted_items: self.shared.counters.submitted_items.load(Ordering::Relaxed),
            executed_items: self.shared.counters.executed_items.load(Ordering::Relaxed),
            abandoned_items: self.shared.counters.abandoned_items.load(Ordering::Relaxed),
        }
    }

    /// Shut the pool down and join all workers.
    ///
    /// Idempotent. Workers blocked on an empty queue wake promptly; a worker
    /// mid-execution finishes its current item before exiting. Items still
    /// queued are dropped unexecuted; dropping an item is what abandons it,
    /// and layers above (the task machinery) turn that drop into an explicit
    /// failure for anyone waiting on the item's outcome.
    pub fn shutdown(&self) {
        let abandoned = {
            let mut state = self.shared.state.lock();
            if state.stopping {
                return;
            }
            state.stopping = true;
            state.queue.drain(..).collect::<Vec<_>>()
        };
        self.shared.work_available.notify_all();

        if !abandoned.is_empty() {
            self.shared
                .counters
                .abandoned_items
                .fetch_add(abandoned.len() as u64, Ordering::Relaxed);
            warn!(
                abandoned = abandoned.len(),
                "dropping queued items at shutdown"
            );
            drop(abandoned);
        }

        let workers = {
            let mut guard = self.workers.lock();
            guard.drain(..).collect::<Vec<_>>()
        };
        for (worker_id, handle) in workers.into_iter().enumerate() {
            if handle.join().is_err() {
                warn!(worker_id, "worker thread panicked");
            }
        }

        info!("worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One worker thread: wait for work, execute it outside the lock, repeat
/// until the pool stops.
fn worker_loop(shared: &PoolShared, worker_id: usize) {
    debug!(worker_id, "worker thread started");

    loop {
        let mut state = shared.state.lock();
        while state.queue.is_empty() && !state.stopping {
            shared.work_available.wait(&mut state);
        }
        if state.stopping {
            break;
        }
        // Non-empty is guaranteed here: the lock is held and the wait loop
        // above only exits with an item present or the stop flag set.
        let Some(item) = state.queue.pop_front() else {
            continue;
        };
        drop(state);

        item.execute();
        shared
            .counters
            .executed_items
            .fetch_add(1, Ordering::Relaxed);
    }

    debug!(worker_id, "worker thread exiting");
}
