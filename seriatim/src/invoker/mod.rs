use crate::error::{ErrorSink, SubmitError, TaskError};
use crate::executor::Executor;
use crate::invocable::{Invocable, InvocationType};
use crate::task::{Task, TaskInfo};
use std::fmt;
use std::sync::Arc;

// Public API
mod builder;
pub use self::builder::Builder;

mod drain;
pub use self::drain::Drain;

// Exports
mod owner;
use owner::Owner;

mod queue;
use queue::{Batch, TaskQueue};

mod redispatch;

mod state;
use state::{Phase, State};


/// Runs tasks from many producers one at a time, in the order they were
/// offered, without ever blocking a producer.
///
/// There are two ways in:
///
/// - [`offer`](SerializedInvoker::offer) queues tasks. The producer that finds
///   the invoker idle gets a [`Drain`] back and becomes responsible for running
///   it; everyone else gets `None` and their tasks are picked up by that drain.
///   Tasks offered from inside a running task are folded into the same drain
///   loop instead of recursing.
/// - [`run`](SerializedInvoker::run) executes tasks right away on the calling
///   thread, handing the rest over to the bound [`Executor`] as soon as a
///   non-blocking-only caller reaches a task that may block.
///
/// Cloning is cheap and every clone refers to the same invoker.
///
/// ```
/// use seriatim::{InlineExecutor, SerializedInvoker, Task};
///
/// let invoker = SerializedInvoker::new("connection-42", InlineExecutor);
///
/// let drain = invoker
///     .offer([Task::new(|| println!("first"))])
///     .expect("invoker was idle");
/// assert!(invoker.offer([Task::new(|| println!("second"))]).is_none());
///
/// // Runs "first" then "second".
/// drain.run();
/// assert!(invoker.is_idle());
/// ```
#[derive(Clone)]
pub struct SerializedInvoker {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    name: Arc<str>,

    /// Where `run` sends work a non-blocking-only thread must not execute.
    executor: Arc<dyn Executor>,

    /// When absent, task failures are logged and dropped.
    error_sink: Option<ErrorSink>,

    state: State,

    queue: TaskQueue,

    owner: Owner,
}

impl SerializedInvoker {
    /// Returns a builder bound to `executor`.
    pub fn builder<E>(executor: E) -> Builder
    where
        E: Executor + 'static,
    {
        Builder::new(Arc::new(executor))
    }

    pub fn new<E>(name: impl Into<String>, executor: E) -> SerializedInvoker
    where
        E: Executor + 'static,
    {
        SerializedInvoker::builder(executor).name(name).build()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Queues `tasks` as one contiguous batch.
    ///
    /// `None` entries are skipped. Returns the [`Drain`] if this call moved the
    /// invoker from idle to running; the caller must then run it, inline or by
    /// handing it to another thread. Returns `None` when nothing was queued,
    /// when another drain is already running, or when called from inside this
    /// invoker's own drain loop: in all those cases the tasks run before the
    /// current drain finishes.
    ///
    /// Never executes a task and never blocks.
    pub fn offer<I, T>(&self, tasks: I) -> Option<Drain>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<Task>>,
    {
        let batch = tasks
            .into_iter()
            .filter_map(Into::<Option<Task>>::into)
            .collect::<Batch>();
        if batch.is_empty() {
            return None;
        }

        let invocation_type =
            InvocationType::combine_all(batch.iter().map(Task::invocation_type));
        tracing::trace!(
            invoker = %self.inner.name,
            tasks = batch.len(),
            %invocation_type,
            "offering tasks"
        );

        // Counting the batch before pushing it keeps a running drain from
        // going idle until it has popped this batch too.
        let acquired = self.inner.state.enqueue();
        self.inner.queue.push(batch);

        // From inside our own drain loop the state is already RUNNING, so a
        // recursive offer never acquires and is folded into that loop.
        if acquired {
            tracing::debug!(invoker = %self.inner.name, "drain acquired");
            Some(Drain::new(self.inner.clone(), invocation_type))
        } else {
            None
        }
    }

    /// Executes `tasks` now, in order, on the calling thread, unless a task
    /// that may block shows up after the caller declared itself non-blocking.
    ///
    /// The first task sets the regime. If it is anything but
    /// [`NonBlocking`](InvocationType::NonBlocking), the caller is assumed to
    /// tolerate blocking and every task runs in place. Otherwise tasks run in
    /// place while they are non-blocking; the first one that is not, together
    /// with everything after it, is submitted to the executor as a single
    /// continuation and this call returns without running them.
    ///
    /// Does not touch the `offer` queue. Task failures are reported to the
    /// error sink; a failed submission is returned to the caller.
    pub fn run<I>(&self, tasks: I) -> Result<(), SubmitError>
    where
        I: IntoIterator<Item = Task>,
    {
        self.inner.run(tasks)
    }

    /// Returns true if the calling thread is inside this invoker's drain loop,
    /// including while running one of its tasks.
    pub fn is_current_thread_invoking(&self) -> bool {
        self.inner.owner.is_current_thread()
    }

    /// Returns true if no drain currently owns the invoker. Racy by nature,
    /// only meant for diagnostics and tests.
    pub fn is_idle(&self) -> bool {
        self.inner.state.phase() == Phase::Idle
    }
}

impl Inner {
    /// Runs one task, routing any failure to the error sink.
    fn execute(&self, task: Task) {
        tracing::trace!(invoker = %self.name, task = %task.info(), "running task");

        if let Err((info, err)) = task.execute() {
            self.report(&info, &err);
        }
    }

    fn report(&self, info: &TaskInfo, err: &TaskError) {
        match &self.error_sink {
            Some(sink) => sink(info, err),
            None => tracing::warn!(
                invoker = %self.name,
                task = %info,
                error = %err,
                "serialized invocation error"
            ),
        }
    }
}

impl fmt::Display for SerializedInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerializedInvoker{{{}}}", self.inner.name)
    }
}

impl fmt::Debug for SerializedInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializedInvoker")
            .field("name", &self.inner.name)
            .field("phase", &self.inner.state.phase())
            .field("pending_batches", &self.inner.state.pending())
            .field("queue", &self.inner.queue)
            .field("owner", &self.inner.owner.current())
            .finish()
    }
}
