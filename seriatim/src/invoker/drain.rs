use super::Inner;
use crate::invocable::{Invocable, InvocationType};
use crate::utils::{ScopeGuard, current_thread_token};
use std::fmt;
use std::sync::Arc;
use std::thread;

/// Exclusive permission to drain an invoker's queue, handed to exactly one
/// [`offer`](crate::SerializedInvoker::offer) caller per idle period.
///
/// [`run`](Drain::run) executes every queued task, including tasks offered
/// while it runs, and returns once the queue is empty and the invoker is back
/// to idle. It blocks for as long as those tasks take: a reactor thread should
/// check [`invocation_type`](Invocable::invocation_type) and hand a blocking
/// drain to another thread instead of running it inline.
///
/// Dropping a `Drain` without running it gives the invoker back without
/// running anything. Queued tasks then wait for the next successful
/// [`offer`](crate::SerializedInvoker::offer) and its drain; if the invoker is
/// never offered to again, they never run.
#[must_use = "queued tasks only run once the drain is run"]
pub struct Drain {
    // Taken by `run`; still present on drop means the drain was abandoned.
    inner: Option<Arc<Inner>>,

    invocation_type: InvocationType,
}

impl Drain {
    pub(super) fn new(inner: Arc<Inner>, invocation_type: InvocationType) -> Drain {
        Drain {
            inner: Some(inner),
            invocation_type,
        }
    }

    /// Name of the invoker this drain belongs to.
    pub fn invoker_name(&self) -> &str {
        self.inner.as_ref().map_or("", |inner| &inner.name)
    }

    /// Drains the queue until it is empty, then returns the invoker to idle.
    pub fn run(mut self) {
        if let Some(inner) = self.inner.take() {
            inner.drain();
        }
    }
}

impl Inner {
    fn drain(&self) {
        let token = current_thread_token();
        self.owner.mark(token);

        // Give up the marker on every exit path, unwinding included.
        let _owner = ScopeGuard::new(|| self.owner.unmark(token));

        let mut executed = 0_usize;
        loop {
            let mut popped = false;
            while let Some(batch) = self.queue.pop() {
                self.state.consumed();
                popped = true;
                for task in batch {
                    self.execute(task);
                    executed += 1;
                }
            }

            // Fails while any offer has counted a batch we have not popped.
            if self.state.try_release() {
                break;
            }

            if !popped {
                // That offer has not pushed its batch yet.
                thread::yield_now();
            }
        }

        tracing::debug!(invoker = %self.name, executed, "drain released");
    }
}

impl Invocable for Drain {
    /// Combined invocation type of the batch whose offer acquired this drain.
    fn invocation_type(&self) -> InvocationType {
        self.invocation_type
    }
}

impl Drop for Drain {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            let queued_batches = inner.state.abandon();
            tracing::error!(
                invoker = %inner.name,
                queued_batches,
                "drain dropped without running, queued tasks wait for the next offer"
            );
        }
    }
}

impl fmt::Debug for Drain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drain")
            .field("invoker", &self.invoker_name())
            .field("invocation_type", &self.invocation_type)
            .finish()
    }
}
