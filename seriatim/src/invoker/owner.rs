use crate::utils::{ThreadToken, current_thread_token};
use std::sync::atomic::{AtomicU64, Ordering};

const NO_OWNER: u64 = 0;

/// Records which thread, if any, is inside an invoker's drain loop.
///
/// Only the thread holding the RUNNING state writes its own token here, and
/// only clears it if the token is still its own: a thread that just released
/// the state may race a new drainer that already marked itself.
#[derive(Debug)]
pub(super) struct Owner(AtomicU64);

impl Owner {
    pub(super) fn new() -> Owner {
        Owner(AtomicU64::new(NO_OWNER))
    }

    pub(super) fn mark(&self, token: ThreadToken) {
        self.0.store(token.as_u64(), Ordering::SeqCst);
    }

    pub(super) fn unmark(&self, token: ThreadToken) {
        let _ = self.0.compare_exchange(
            token.as_u64(),
            NO_OWNER,
            Ordering::SeqCst,
            Ordering::Relaxed,
        );
    }

    pub(super) fn current(&self) -> Option<ThreadToken> {
        ThreadToken::from_u64(self.0.load(Ordering::SeqCst))
    }

    pub(super) fn is_current_thread(&self) -> bool {
        self.current() == Some(current_thread_token())
    }
}
