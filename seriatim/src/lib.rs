//! A serialized invoker: many producers feed tasks into one logically serial
//! execution stream.
//!
//! - At most one thread runs the tasks of a given [`SerializedInvoker`] at any
//!   instant, in the order they were offered.
//! - Tasks are never dropped nor run twice, even when offered while the
//!   invoker is about to go idle.
//! - Tasks offered from inside a running task become one more iteration of the
//!   running drain loop rather than a nested call, so the stack stays flat.
//! - A thread that may only run non-blocking work never runs a blocking task
//!   in place: [`SerializedInvoker::run`] hands it to an [`Executor`].

mod error;
pub use error::{ErrorSink, SubmitError, TaskError};

pub mod executor;
pub use executor::{Executor, InlineExecutor, Job, SpawnExecutor};

mod invocable;
pub use invocable::{Invocable, InvocationType};

pub mod invoker;
pub use invoker::{Builder, Drain, SerializedInvoker};

pub mod task;
pub use task::{Task, TaskInfo};

mod utils;

#[cfg(test)]
mod test_utils;
