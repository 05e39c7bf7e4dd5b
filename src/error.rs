use crate::cancel::Cancelled;

/// Errors reported by a [`CompletionQueue`](crate::CompletionQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An operation was submitted after input had been closed.
    #[error("cannot submit operations after input has been closed")]
    InvalidState,
    /// A drain was interrupted by its cancellation signal.
    #[error("drain was cancelled while waiting for the next operation")]
    Cancelled,
}

impl From<Cancelled> for Error {
    fn from(_: Cancelled) -> Self {
        Error::Cancelled
    }
}
