use std::sync::atomic::{AtomicU64, Ordering};

// Bit 0 is the RUNNING flag; the remaining bits count batches that have been
// offered but not yet popped by the drain loop.
const IDLE: u64 = 0;
const RUNNING: u64 = 1;
const ONE_BATCH: u64 = 1 << 1;

/// Observable phase of an invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Phase {
    Idle,
    Running,
}

/// Decides which caller drains the queue, and when that drain may stop.
///
/// The RUNNING flag and the number of pending batches share one atomic word,
/// so going idle and the queue being empty are a single step: `try_release`
/// only succeeds from RUNNING with nothing pending, and any `enqueue` that
/// lands first makes it fail. Only compare-and-swap or read-modify-write
/// operations move it, so producers never wait on it.
#[derive(Debug)]
pub(super) struct State(AtomicU64);

impl State {
    pub(super) fn new() -> State {
        State(AtomicU64::new(IDLE))
    }

    /// Counts one more pending batch and sets RUNNING in the same step.
    ///
    /// Returns true if the invoker was idle, i.e. the caller now owns the
    /// drain. Must be called before the batch is pushed.
    pub(super) fn enqueue(&self) -> bool {
        let (Ok(prev) | Err(prev)) =
            self.0
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                    Some((state + ONE_BATCH) | RUNNING)
                });
        prev & RUNNING == IDLE
    }

    /// One pending batch was popped by the drain loop.
    pub(super) fn consumed(&self) {
        let prev = self.0.fetch_sub(ONE_BATCH, Ordering::SeqCst);
        debug_assert!(
            prev & RUNNING == RUNNING && prev >= ONE_BATCH,
            "batch consumed outside a drain or without being counted: {prev}"
        );
    }

    /// RUNNING with nothing pending -> IDLE.
    ///
    /// Returns false if batches are still pending; the drain must keep going.
    /// Must only be called by the owner of the drain.
    pub(super) fn try_release(&self) -> bool {
        match self
            .0
            .compare_exchange(RUNNING, IDLE, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => true,
            Err(actual) if actual & RUNNING == RUNNING => false,
            Err(actual) => Self::corrupted(actual),
        }
    }

    /// Drops RUNNING whatever is pending, for a drain that will never run.
    /// Returns the number of batches left behind.
    pub(super) fn abandon(&self) -> u64 {
        let prev = self.0.fetch_and(!RUNNING, Ordering::SeqCst);
        if prev & RUNNING != RUNNING {
            Self::corrupted(prev);
        }
        prev >> 1
    }

    pub(super) fn phase(&self) -> Phase {
        match self.0.load(Ordering::SeqCst) & RUNNING {
            IDLE => Phase::Idle,
            _ => Phase::Running,
        }
    }

    /// Batches offered but not yet picked up by a drain.
    pub(super) fn pending(&self) -> u64 {
        self.0.load(Ordering::SeqCst) >> 1
    }

    #[cold]
    fn corrupted(actual: u64) -> ! {
        panic!(
            "serialized invoker state corrupted: releasing the drain from state {:#x}",
            actual
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_state_lifecycle() {
        let state = State::new();
        assert_eq!(state.phase(), Phase::Idle);

        assert!(state.enqueue());
        assert_eq!(state.phase(), Phase::Running);
        assert!(!state.enqueue());
        assert_eq!(state.pending(), 2);

        state.consumed();
        state.consumed();
        assert!(state.try_release());
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.pending(), 0);
        assert!(state.enqueue());
    }

    #[test]
    fn test_release_refused_while_batches_pending() {
        let state = State::new();
        assert!(state.enqueue());
        state.consumed();

        // An offer lands between the last pop and the idle transition.
        assert!(!state.enqueue());
        assert!(!state.try_release());
        assert_eq!(state.phase(), Phase::Running);

        state.consumed();
        assert!(state.try_release());
    }

    #[test]
    fn test_abandon_keeps_pending_count() {
        let state = State::new();
        assert!(state.enqueue());
        assert!(!state.enqueue());

        assert_eq!(state.abandon(), 2);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.pending(), 2);

        // The next offer takes over the leftovers.
        assert!(state.enqueue());
        assert_eq!(state.pending(), 3);
    }

    #[test]
    #[should_panic(expected = "serialized invoker state corrupted")]
    fn test_release_while_idle_is_fatal() {
        State::new().try_release();
    }

    #[test]
    #[should_panic(expected = "serialized invoker state corrupted")]
    fn test_abandon_while_idle_is_fatal() {
        State::new().abandon();
    }

    #[test]
    fn test_single_winner_per_idle_period() {
        let n = 8;
        let state = Arc::new(State::new());
        let barrier = Arc::new(Barrier::new(n));

        let winners = (0..n)
            .map(|_| {
                let state = state.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    state.enqueue()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().expect("acquiring thread panicked"))
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(state.pending(), n as u64);
    }
}
