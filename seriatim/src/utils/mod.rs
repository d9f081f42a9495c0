pub(crate) mod scope_guard;
pub(crate) use scope_guard::ScopeGuard;

pub(crate) mod thread;
pub(crate) use thread::{ThreadNameFn, ThreadToken, current_thread_token};
