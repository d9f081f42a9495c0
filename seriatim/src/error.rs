use crate::task::TaskInfo;
use std::any::Any;
use std::io;
use std::sync::Arc;

/// Why a task did not complete.
#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    /// The task body returned an error.
    #[error("task failed: {0}")]
    Failed(#[from] anyhow::Error),

    /// The task body panicked. Holds the panic message when it was a string.
    #[error("task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };

        TaskError::Panicked(msg)
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked(_))
    }
}

/// Failure to hand work over to an [`Executor`](crate::Executor).
#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    /// The executor refused the job, e.g. because it is shutting down.
    #[error("executor rejected job: {0}")]
    Rejected(String),

    /// The executor could not acquire the resources to run the job.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A catch-all for any other type of unexpected error.
    #[error("An unexpected error occurred: {0}")]
    Other(#[from] anyhow::Error),
}

impl SubmitError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, SubmitError::Rejected(_))
    }
}

/// Receives every task failure caught by an invoker.
///
/// The task itself is gone by the time it failed, so the sink gets the
/// task's [`TaskInfo`] instead.
pub type ErrorSink = Arc<dyn Fn(&TaskInfo, &TaskError) + Send + Sync + 'static>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::panic::{self, UnwindSafe};

    fn panic_payload(f: impl FnOnce() + UnwindSafe) -> Box<dyn Any + Send + 'static> {
        match panic::catch_unwind(f) {
            Ok(()) => unreachable!("closure was expected to panic"),
            Err(payload) => payload,
        }
    }

    #[test]
    fn test_panic_payload_is_rendered() {
        let payload = panic_payload(|| panic!("static message"));
        let err = TaskError::from_panic(payload);
        assert!(err.is_panic());
        assert_eq!(err.to_string(), "task panicked: static message");

        let payload = panic_payload(|| panic!("formatted {}", 42));
        assert_eq!(
            TaskError::from_panic(payload).to_string(),
            "task panicked: formatted 42"
        );

        let payload = panic_payload(|| panic::panic_any(7_u32));
        assert_eq!(
            TaskError::from_panic(payload).to_string(),
            "task panicked: <non-string panic payload>"
        );
    }

    #[test]
    fn test_submit_error_kinds() {
        assert!(SubmitError::Rejected("closed".into()).is_rejected());

        let err: SubmitError = io::Error::other("no threads left").into();
        assert!(!err.is_rejected());
        assert!(matches!(err, SubmitError::Io(_)));

        let err: SubmitError = anyhow!("weird").into();
        assert!(matches!(err, SubmitError::Other(_)));
    }
}
