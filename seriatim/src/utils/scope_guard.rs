/// Runs a closure when dropped, on every exit path of the enclosing scope:
/// normal return, early return with `?`, or unwinding out of a panic.
///
/// The drain loop relies on this to give up the invoking-thread marker even
/// when the loop machinery itself panics.
#[must_use = "the closure runs as soon as an unbound guard is dropped"]
pub(crate) struct ScopeGuard<F: FnOnce()> {
    // Taken out on drop so a panicking closure can't be invoked twice.
    on_exit: Option<F>,
}

impl<F: FnOnce()> ScopeGuard<F> {
    pub(crate) fn new(on_exit: F) -> Self {
        ScopeGuard {
            on_exit: Some(on_exit),
        }
    }
}

impl<F: FnOnce()> Drop for ScopeGuard<F> {
    fn drop(&mut self) {
        if let Some(on_exit) = self.on_exit.take() {
            on_exit();
        }
    }
}
