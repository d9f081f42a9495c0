use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque ID that uniquely identifies a task for the lifetime of the process.
///
/// Tasks have no identity beyond this ID: two tasks built from the same
/// closure are still two different tasks.
///
/// # Notes
///
/// - Task IDs are *not* sequential across threads, and do not indicate the
///   order in which tasks were offered or run.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Id(NonZeroU64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Id {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);

        let id = COUNTER.fetch_add(1, Ordering::Relaxed);

        // Safety: this number is unimaginably large, even creating 1 billion
        // tasks/sec it would take 584 years to wrap around.
        let Some(id) = NonZeroU64::new(id) else {
            Self::exhausted();
        };

        Self(id)
    }

    #[cold]
    fn exhausted() -> ! {
        panic!("failed to generate unique task ID: bitspace exhausted")
    }

    pub fn as_u64(&self) -> u64 {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_new_task_id_unique() {
        let n = 13;
        let mut all_ids = (0..n).map(|_| Id::next()).collect::<HashSet<_>>();

        let other_thread = thread::spawn(move || (0..n).map(|_| Id::next()).collect::<Vec<_>>());
        all_ids.extend(other_thread.join().expect("id thread panicked"));

        assert_eq!(all_ids.len(), 2 * n);
    }
}
