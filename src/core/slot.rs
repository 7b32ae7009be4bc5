//! Single-assignment result slot with blocking, shareable reads.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::core::error::TaskResult;

/// Write-once, many-reads storage for a task outcome.
///
/// The slot is written exactly once, by whichever execution path finishes
/// the computation, and never consumed: every reader gets a clone of the
/// same outcome. Reads before the write block on a condvar; reads after it
/// return immediately. Callers need no external locking.
pub struct ResultSlot<T> {
    cell: Mutex<Option<TaskResult<T>>>,
    ready: Condvar,
}

impl<T> ResultSlot<T> {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Write the outcome and wake all waiters.
    ///
    /// # Panics
    ///
    /// Panics if the slot has already been written. A double write is a
    /// programming-contract violation in the runtime, not a recoverable
    /// condition.
    pub fn fulfill(&self, outcome: TaskResult<T>) {
        let mut cell = self.cell.lock();
        assert!(cell.is_none(), "result slot written twice");
        *cell = Some(outcome);
        self.ready.notify_all();
    }

    /// Whether the outcome has been written.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.cell.lock().is_some()
    }
}

impl<T: Clone> ResultSlot<T> {
    /// Block until the outcome is written, then return a clone of it.
    pub fn wait(&self) -> TaskResult<T> {
        let mut cell = self.cell.lock();
        loop {
            if let Some(outcome) = cell.as_ref() {
                return outcome.clone();
            }
            self.ready.wait(&mut cell);
        }
    }

    /// Return a clone of the outcome if it has been written.
    #[must_use]
    pub fn try_get(&self) -> Option<TaskResult<T>> {
        self.cell.lock().as_ref().cloned()
    }

    /// Block up to `timeout` for the outcome.
    ///
    /// Returns `None` if the slot is still empty when the timeout elapses.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<TaskResult<T>> {
        let deadline = Instant::now() + timeout;
        let mut cell = self.cell.lock();
        loop {
            if let Some(outcome) = cell.as_ref() {
                return Some(outcome.clone());
            }
            if self.ready.wait_until(&mut cell, deadline).timed_out() {
                return cell.as_ref().cloned();
            }
        }
    }
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TaskError;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn wait_blocks_until_fulfilled() {
        let slot = Arc::new(ResultSlot::new());
        let writer = Arc::clone(&slot);

        let reader = thread::spawn(move || slot.wait());
        thread::sleep(Duration::from_millis(20));
        writer.fulfill(Ok(7));

        assert_eq!(reader.join().unwrap().unwrap(), 7);
    }

    #[test]
    fn reads_are_idempotent_across_readers() {
        let slot = Arc::new(ResultSlot::new());
        slot.fulfill(Ok("done".to_string()));

        let mut readers = Vec::new();
        for _ in 0..8 {
            let slot = Arc::clone(&slot);
            readers.push(thread::spawn(move || slot.wait()));
        }
        for reader in readers {
            assert_eq!(reader.join().unwrap().unwrap(), "done");
        }
        // The slot is not consumed by reads.
        assert!(slot.is_set());
    }

    #[test]
    fn failure_outcome_fans_out() {
        let slot: ResultSlot<i32> = ResultSlot::new();
        slot.fulfill(Err(TaskError::Shutdown));

        assert!(matches!(slot.wait(), Err(TaskError::Shutdown)));
        assert!(matches!(slot.try_get(), Some(Err(TaskError::Shutdown))));
    }

    #[test]
    #[should_panic(expected = "result slot written twice")]
    fn double_fulfill_panics() {
        let slot = ResultSlot::new();
        slot.fulfill(Ok(1));
        slot.fulfill(Ok(2));
    }

    #[test]
    fn try_get_on_empty_slot() {
        let slot: ResultSlot<i32> = ResultSlot::new();
        assert!(slot.try_get().is_none());
        assert!(!slot.is_set());
    }

    #[test]
    fn wait_timeout_expires_on_empty_slot() {
        let slot: ResultSlot<i32> = ResultSlot::new();
        assert!(slot.wait_timeout(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn wait_timeout_returns_written_value() {
        let slot = Arc::new(ResultSlot::new());
        let writer = Arc::clone(&slot);

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.fulfill(Ok(99));
        });

        let got = slot.wait_timeout(Duration::from_secs(5));
        assert_eq!(got.unwrap().unwrap(), 99);
    }
}
