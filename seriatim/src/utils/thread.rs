use std::cell::Cell;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Produces the name of the next thread spawned by an executor.
pub(crate) type ThreadNameFn = Arc<dyn Fn() -> String + Send + Sync + 'static>;

pub(crate) fn default_thread_name_fn() -> ThreadNameFn {
    let counter = Arc::new(AtomicUsize::new(0));

    Arc::new(move || {
        let prev = counter.fetch_add(1, Ordering::Relaxed);
        format!("seriatim-worker-{}", prev)
    })
}

/// Process-unique identity of an OS thread, packable in an `AtomicU64`.
///
/// We can't use `std::thread::ThreadId` because turning it into an integer is
/// still unstable, and the invoking-thread marker must be stored atomically.
/// Zero is never handed out, so it can stand for "no thread".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ThreadToken(NonZeroU64);

thread_local! {
    static CURRENT: Cell<Option<ThreadToken>> = const { Cell::new(None) };
}

/// Returns the token of the calling thread, assigning one on first use.
pub(crate) fn current_thread_token() -> ThreadToken {
    CURRENT.with(|current| match current.get() {
        Some(token) => token,
        None => {
            let token = ThreadToken::next();
            current.set(Some(token));
            token
        }
    })
}

impl ThreadToken {
    fn next() -> ThreadToken {
        static COUNTER: AtomicU64 = AtomicU64::new(1);

        let id = COUNTER.fetch_add(1, Ordering::Relaxed);

        // Even at a billion threads per second this takes centuries to wrap.
        let Some(id) = NonZeroU64::new(id) else {
            Self::exhausted();
        };

        ThreadToken(id)
    }

    #[cold]
    fn exhausted() -> ! {
        panic!("failed to generate unique thread token: bitspace exhausted")
    }

    pub(crate) fn from_u64(raw: u64) -> Option<ThreadToken> {
        NonZeroU64::new(raw).map(ThreadToken)
    }

    pub(crate) fn as_u64(self) -> u64 {
        self.0.get()
    }
}
