use super::Inner;
use crate::error::SubmitError;
use crate::executor::Job;
use crate::invocable::Invocable;
use crate::task::Task;
use std::iter;
use std::sync::Arc;

impl Inner {
    pub(super) fn run<I>(self: &Arc<Self>, tasks: I) -> Result<(), SubmitError>
    where
        I: IntoIterator<Item = Task>,
    {
        let mut tasks = tasks.into_iter();

        let Some(first) = tasks.next() else {
            return Ok(());
        };

        if !first.invocation_type().is_non_blocking() {
            // The caller tolerates blocking, moving work elsewhere would only
            // add latency.
            self.execute(first);
            tasks.for_each(|task| self.execute(task));
            return Ok(());
        }

        self.execute(first);

        while let Some(task) = tasks.next() {
            if task.invocation_type().is_non_blocking() {
                self.execute(task);
                continue;
            }

            let remaining = iter::once(task).chain(tasks).collect::<Vec<_>>();
            return self.redispatch(remaining);
        }

        Ok(())
    }

    /// Submits `tasks` to the executor as one continuation, run in order.
    fn redispatch(self: &Arc<Self>, tasks: Vec<Task>) -> Result<(), SubmitError> {
        let count = tasks.len();
        tracing::debug!(
            invoker = %self.name,
            tasks = count,
            "non-blocking caller reached a blocking task, redispatching"
        );

        let inner = Arc::clone(self);
        let continuation: Job = Box::new(move || {
            for task in tasks {
                inner.execute(task);
            }
        });

        self.executor.submit(continuation).inspect_err(|e| {
            tracing::error!(
                invoker = %self.name,
                tasks = count,
                error = %e,
                "failed to redispatch tasks"
            );
        })
    }
}
