use crate::error::{SubmitError, TaskError};
use crate::executor::{Executor, Job};
use crate::invocable::InvocationType;
use crate::invoker::SerializedInvoker;
use crate::task::{Id, Task, TaskInfo};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

pub(crate) const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Polls `cond` until it holds or `timeout` expires. Returns the last result.
pub(crate) fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}

/// Runs jobs one after another on a single dedicated thread.
#[derive(Debug)]
pub(crate) struct SingleThreadExecutor {
    jobs: Sender<Job>,
    worker: ThreadId,
}

impl SingleThreadExecutor {
    pub(crate) fn new() -> Arc<Self> {
        let (jobs, rx) = mpsc::channel::<Job>();
        let handle = thread::Builder::new()
            .name("seriatim-test-executor".to_string())
            .spawn(move || {
                // Exits once every sender is gone.
                for job in rx {
                    job();
                }
            })
            .expect("failed to spawn test executor thread");

        Arc::new(Self {
            jobs,
            worker: handle.thread().id(),
        })
    }

    pub(crate) fn worker(&self) -> ThreadId {
        self.worker
    }

    /// Runs `f` on the worker thread and waits for its result.
    pub(crate) fn call<R, F>(&self, f: F) -> R
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.submit(Box::new(move || {
            let _ = tx.send(f());
        }))
        .expect("test executor is gone");

        rx.recv_timeout(WAIT_TIMEOUT)
            .expect("test executor did not answer in time")
    }
}

impl Executor for SingleThreadExecutor {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        self.jobs
            .send(job)
            .map_err(|_| SubmitError::Rejected("test executor stopped".to_string()))
    }
}

/// Refuses every job.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RejectingExecutor;

impl Executor for RejectingExecutor {
    fn submit(&self, _job: Job) -> Result<(), SubmitError> {
        Err(SubmitError::Rejected("shutting down".to_string()))
    }
}

/// One observed task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Visit {
    pub(crate) label: &'static str,
    pub(crate) thread: ThreadId,
    pub(crate) invoking: bool,
}

/// Shared log of task executions, in execution order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Spy {
    visits: Arc<Mutex<Vec<Visit>>>,
}

impl Spy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, label: &'static str, invoking: bool) {
        self.visits.lock().push(Visit {
            label,
            thread: thread::current().id(),
            invoking,
        });
    }

    /// A task that only records where it ran.
    pub(crate) fn task(&self, label: &'static str, invocation_type: InvocationType) -> Task {
        let spy = self.clone();
        Task::from_type(invocation_type, move || spy.record(label, false)).named(label)
    }

    /// A task that records where it ran and whether it saw itself inside the
    /// drain loop of `invoker`.
    pub(crate) fn probe(&self, invoker: &SerializedInvoker, label: &'static str) -> Task {
        let spy = self.clone();
        let invoker = invoker.clone();
        Task::new(move || spy.record(label, invoker.is_current_thread_invoking())).named(label)
    }

    pub(crate) fn visits(&self) -> Vec<Visit> {
        self.visits.lock().clone()
    }

    pub(crate) fn labels(&self) -> Vec<&'static str> {
        self.visits.lock().iter().map(|v| v.label).collect()
    }

    pub(crate) fn threads(&self) -> Vec<ThreadId> {
        self.visits.lock().iter().map(|v| v.thread).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.visits.lock().len()
    }

    pub(crate) fn has_run(&self, label: &'static str) -> bool {
        self.visits.lock().iter().any(|v| v.label == label)
    }
}

/// Error sink that keeps every reported failure.
#[derive(Debug, Clone, Default)]
pub(crate) struct CollectingSink {
    failures: Arc<Mutex<Vec<(Id, bool, String)>>>,
}

impl CollectingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sink(&self) -> impl Fn(&TaskInfo, &TaskError) + Send + Sync + use<> {
        let failures = self.failures.clone();
        move |info, err| {
            failures
                .lock()
                .push((info.id(), err.is_panic(), err.to_string()))
        }
    }

    /// (task id, was a panic, rendered error) per failure, in report order.
    pub(crate) fn failures(&self) -> Vec<(Id, bool, String)> {
        self.failures.lock().clone()
    }
}
