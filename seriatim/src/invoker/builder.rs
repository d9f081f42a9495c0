use super::{Inner, Owner, SerializedInvoker, State, TaskQueue};
use crate::error::{ErrorSink, TaskError};
use crate::executor::Executor;
use crate::task::TaskInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn default_name() -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let prev = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("serialized-invoker-{}", prev)
}

/// Configures a [`SerializedInvoker`].
///
/// ```
/// use seriatim::{SerializedInvoker, SpawnExecutor};
///
/// let invoker = SerializedInvoker::builder(SpawnExecutor::new())
///     .name("http-conn-7")
///     .error_sink(|task, err| eprintln!("{task} failed: {err}"))
///     .build();
///
/// assert_eq!(invoker.name(), "http-conn-7");
/// ```
pub struct Builder {
    /// Executor that `run` redispatches blocking work to.
    executor: Arc<dyn Executor>,

    /// Only used to correlate logs.
    ///
    /// The default name is "serialized-invoker-{N}".
    name: Option<String>,

    /// Receives task failures. Failures are logged when unset.
    error_sink: Option<ErrorSink>,
}

impl Builder {
    pub(super) fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            name: None,
            error_sink: None,
        }
    }

    pub fn name(&mut self, val: impl Into<String>) -> &mut Self {
        self.name = Some(val.into());
        self
    }

    /// Sets the function receiving every failure caught while running tasks,
    /// whether returned as an error or raised as a panic.
    pub fn error_sink<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&TaskInfo, &TaskError) + Send + Sync + 'static,
    {
        self.error_sink = Some(Arc::new(f));
        self
    }

    pub fn build(&mut self) -> SerializedInvoker {
        let name = self.name.clone().unwrap_or_else(default_name);

        SerializedInvoker {
            inner: Arc::new(Inner {
                name: name.into(),
                executor: self.executor.clone(),
                error_sink: self.error_sink.clone(),
                state: State::new(),
                queue: TaskQueue::new(),
                owner: Owner::new(),
            }),
        }
    }
}
