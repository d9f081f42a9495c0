use crate::error::TaskError;
use crate::invocable::{Invocable, InvocationType};
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

// Public API
pub mod id;
pub use self::id::Id;

type Body = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// A zero-argument unit of work, run at most once.
///
/// Every task carries its [`InvocationType`], fixed at construction. Tasks
/// built with [`Task::new`] are assumed to be blocking.
///
/// ```
/// use seriatim::{InvocationType, Task};
///
/// let task = Task::non_blocking(|| println!("quick")).named("greeter");
/// assert_eq!(task.info().invocation_type(), InvocationType::NonBlocking);
/// assert_eq!(task.info().name(), Some("greeter"));
/// ```
pub struct Task {
    info: TaskInfo,
    body: Body,
}

impl Task {
    /// Creates a task that may block.
    pub fn new<F>(f: F) -> Task
    where
        F: FnOnce() + Send + 'static,
    {
        Task::from_type(InvocationType::Blocking, f)
    }

    /// Creates a task that never blocks the thread running it.
    pub fn non_blocking<F>(f: F) -> Task
    where
        F: FnOnce() + Send + 'static,
    {
        Task::from_type(InvocationType::NonBlocking, f)
    }

    /// Creates a task that does not care whether it runs on a blocking-capable
    /// thread.
    pub fn either<F>(f: F) -> Task
    where
        F: FnOnce() + Send + 'static,
    {
        Task::from_type(InvocationType::Either, f)
    }

    pub fn from_type<F>(invocation_type: InvocationType, f: F) -> Task
    where
        F: FnOnce() + Send + 'static,
    {
        Task::try_new(invocation_type, move || {
            f();
            Ok(())
        })
    }

    /// Creates a task whose body can fail. Errors are handed to the invoker's
    /// error sink, like panics.
    pub fn try_new<F>(invocation_type: InvocationType, f: F) -> Task
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Task {
            info: TaskInfo {
                id: Id::next(),
                name: None,
                invocation_type,
            },
            body: Box::new(f),
        }
    }

    /// Attaches a name, only used to correlate logs and error reports.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Task {
        self.info.name = Some(name.into());
        self
    }

    pub fn id(&self) -> Id {
        self.info.id
    }

    pub fn info(&self) -> &TaskInfo {
        &self.info
    }

    /// Runs the body, turning both an `Err` return and a panic into a
    /// [`TaskError`]. On failure the task's info is handed back for reporting.
    pub(crate) fn execute(self) -> Result<(), (TaskInfo, TaskError)> {
        let Task { info, body } = self;

        match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err((info, TaskError::Failed(e))),
            Err(payload) => Err((info, TaskError::from_panic(payload))),
        }
    }
}

impl Invocable for Task {
    fn invocation_type(&self) -> InvocationType {
        self.info.invocation_type
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("info", &self.info).finish()
    }
}

/// Everything observable about a task without running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    id: Id,
    name: Option<Cow<'static, str>>,
    invocation_type: InvocationType,
}

impl TaskInfo {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn invocation_type(&self) -> InvocationType {
        self.invocation_type
    }
}

impl fmt::Display for TaskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}#{}/{}", name, self.id, self.invocation_type),
            None => write!(f, "task#{}/{}", self.id, self.invocation_type),
        }
    }
}
