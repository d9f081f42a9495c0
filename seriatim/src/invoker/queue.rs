use crate::task::Task;
use crossbeam_queue::SegQueue;
use smallvec::SmallVec;
use std::fmt;

/// Most offers carry a handful of tasks; keep those off the heap.
const INLINE_BATCH_SIZE: usize = 4;

/// The tasks of one `offer` call, in the order given.
pub(super) type Batch = SmallVec<[Task; INLINE_BATCH_SIZE]>;

/// Unbounded FIFO of batches.
///
/// Any number of threads may push concurrently without blocking; a single
/// draining thread pops at a time. Queueing whole batches is what keeps the
/// tasks of one offer contiguous: nothing can land between them.
pub(super) struct TaskQueue {
    batches: SegQueue<Batch>,
}

impl TaskQueue {
    pub(super) fn new() -> TaskQueue {
        TaskQueue {
            batches: SegQueue::new(),
        }
    }

    pub(super) fn push(&self, batch: Batch) {
        debug_assert!(!batch.is_empty(), "empty batches are never queued");
        self.batches.push(batch);
    }

    pub(super) fn pop(&self) -> Option<Batch> {
        self.batches.pop()
    }

    /// Number of queued batches, not tasks.
    pub(super) fn len(&self) -> usize {
        self.batches.len()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("batches", &self.len())
            .finish()
    }
}
