use crate::error::SubmitError;
use crate::executor::{Executor, Job};
use crate::utils::ThreadNameFn;
use crate::utils::thread::default_thread_name_fn;
use std::fmt;
use std::sync::Arc;
use std::thread;

/// Runs every job on a freshly spawned, detached OS thread.
///
/// This is the simplest executor that is always safe to redispatch blocking
/// work to. Failing to spawn a thread is reported as [`SubmitError::Io`].
#[derive(Clone)]
pub struct SpawnExecutor {
    thread_name: ThreadNameFn,
    thread_stack_size: Option<usize>,
}

impl SpawnExecutor {
    pub fn new() -> SpawnExecutor {
        SpawnExecutor::builder().build()
    }

    pub fn builder() -> SpawnExecutorBuilder {
        SpawnExecutorBuilder::new()
    }
}

impl Default for SpawnExecutor {
    fn default() -> Self {
        SpawnExecutor::new()
    }
}

impl Executor for SpawnExecutor {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        let mut builder = thread::Builder::new().name((self.thread_name)());

        if let Some(stack_size) = self.thread_stack_size {
            builder = builder.stack_size(stack_size);
        }

        // Detached: the job owns everything it needs.
        builder.spawn(job)?;
        Ok(())
    }
}

impl fmt::Debug for SpawnExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnExecutor")
            .field("thread_stack_size", &self.thread_stack_size)
            .finish_non_exhaustive()
    }
}

pub struct SpawnExecutorBuilder {
    /// Name fn used for spawned threads.
    thread_name: ThreadNameFn,

    /// Stack size used for spawned threads.
    thread_stack_size: Option<usize>,
}

impl SpawnExecutorBuilder {
    fn new() -> Self {
        Self {
            thread_name: default_thread_name_fn(),
            thread_stack_size: None,
        }
    }

    /// Sets the name of every spawned thread.
    ///
    /// The default name is "seriatim-worker-{N}".
    pub fn thread_name(&mut self, val: impl Into<String>) -> &mut Self {
        let val = val.into();
        self.thread_name = Arc::new(move || val.clone());
        self
    }

    /// Sets a function used to generate the name of spawned threads.
    ///
    /// The default name fn yields names with monotonically increasing N
    /// "seriatim-worker-{N}".
    pub fn thread_name_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.thread_name = Arc::new(f);
        self
    }

    /// Sets the stack size (in bytes) of spawned threads.
    ///
    /// The actual stack size may be greater than this value if the platform
    /// specifies minimal stack size.
    pub fn thread_stack_size(&mut self, val: usize) -> &mut Self {
        self.thread_stack_size = Some(val);
        self
    }

    pub fn build(&mut self) -> SpawnExecutor {
        SpawnExecutor {
            thread_name: self.thread_name.clone(),
            thread_stack_size: self.thread_stack_size,
        }
    }
}
