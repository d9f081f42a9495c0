use crate::error::SubmitError;
use std::sync::Arc;

// Public API
mod spawn;
pub use self::spawn::{SpawnExecutor, SpawnExecutorBuilder};

/// A unit of work handed to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs work somewhere else.
///
/// This is the only thing a [`SerializedInvoker`](crate::SerializedInvoker)
/// needs from a thread pool: a way to move blocking work off a thread that
/// must not block. Implementations may run the job inline, immediately on
/// another thread, or later; the invoker only relies on it eventually running
/// on some thread. No ordering is required between separately submitted jobs.
pub trait Executor: Send + Sync {
    /// Submits a job for execution. Must be callable from any thread.
    fn submit(&self, job: Job) -> Result<(), SubmitError>;
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        (**self).submit(job)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        (**self).submit(job)
    }
}

/// Runs every job on the submitting thread before `submit` returns.
///
/// Handy for tests and for callers that already run on a blocking-capable
/// thread, never for reactor threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        job();
        Ok(())
    }
}
