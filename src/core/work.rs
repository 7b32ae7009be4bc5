//! The work item abstraction consumed by the worker pool.

/// An atomic, synchronous unit of work.
///
/// `execute` consumes the boxed item, so every work item runs exactly once;
/// there is no way to re-submit an already-executed item. Implementations
/// must not unwind out of `execute`: a panic escaping a work item tears
/// down its worker thread. Layers that run user code (the task machinery)
/// catch panics before they reach the pool.
pub trait WorkItem: Send + 'static {
    /// Run the work. Called from exactly one worker thread, outside the
    /// pool's queue lock.
    fn execute(self: Box<Self>);
}

/// Plain closures are submittable as work items.
impl<F> WorkItem for F
where
    F: FnOnce() + Send + 'static,
{
    fn execute(self: Box<Self>) {
        (*self)();
    }
}
