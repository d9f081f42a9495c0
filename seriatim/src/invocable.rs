use std::fmt;

/// Declares whether running a piece of work may block the thread running it.
///
/// Reactor threads dispatching I/O readiness must only ever run
/// [`NonBlocking`](InvocationType::NonBlocking) work, otherwise every other
/// connection they serve stalls. Work that does not say anything is assumed to
/// be [`Blocking`](InvocationType::Blocking).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationType {
    /// May block the calling thread.
    #[default]
    Blocking,

    /// Guaranteed not to block the calling thread.
    NonBlocking,

    /// Can be run either way; adopts whatever it is combined with.
    Either,
}

impl InvocationType {
    /// Combines the invocation types of two pieces of work run back to back.
    ///
    /// `Either` is neutral, two `NonBlocking` stay `NonBlocking`, and anything
    /// involving `Blocking` is `Blocking`.
    pub fn combine(self, other: InvocationType) -> InvocationType {
        match (self, other) {
            (InvocationType::Either, other) | (other, InvocationType::Either) => other,
            (InvocationType::NonBlocking, InvocationType::NonBlocking) => {
                InvocationType::NonBlocking
            }
            _ => InvocationType::Blocking,
        }
    }

    /// Combines a sequence of invocation types. An empty sequence is `Either`.
    pub fn combine_all<I>(types: I) -> InvocationType
    where
        I: IntoIterator<Item = InvocationType>,
    {
        types
            .into_iter()
            .fold(InvocationType::Either, InvocationType::combine)
    }

    pub fn is_non_blocking(self) -> bool {
        matches!(self, InvocationType::NonBlocking)
    }
}

impl fmt::Display for InvocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvocationType::Blocking => "BLOCKING",
            InvocationType::NonBlocking => "NON_BLOCKING",
            InvocationType::Either => "EITHER",
        };
        f.write_str(s)
    }
}

/// Something that knows how it may be invoked.
pub trait Invocable {
    fn invocation_type(&self) -> InvocationType {
        InvocationType::Blocking
    }
}
