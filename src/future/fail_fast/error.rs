use core::fmt;
use core::ops::{Deref, DerefMut};
use core::slice;
use std::error::Error;

/// A collection of errors, in the order the failing operations settled.
#[repr(transparent)]
pub struct AggregateError<E> {
    pub(crate) inner: Vec<E>,
}

impl<E> AggregateError<E> {
    pub(crate) fn new(inner: Vec<E>) -> Self {
        Self { inner }
    }

    /// Take the underlying errors.
    pub fn into_inner(self) -> Vec<E> {
        self.inner
    }
}

impl<E: fmt::Debug> fmt::Debug for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} errors occurred:", self.inner.len())?;

        for (i, err) in self.inner.iter().enumerate() {
            writeln!(f, "- Error {}: {err:?}", i + 1)?;
        }

        Ok(())
    }
}

impl<E> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred", self.inner.len())
    }
}

impl<E> Deref for AggregateError<E> {
    type Target = Vec<E>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<E> DerefMut for AggregateError<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<E> IntoIterator for AggregateError<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<E: Error> Error for AggregateError<E> {}

/// The error returned by [`JoinFailFast`](super::JoinFailFast).
pub enum JoinError<E> {
    /// Exactly one operation failed.
    Failed(E),
    /// More than one operation failed.
    Aggregate(AggregateError<E>),
    /// No operation failed, but the batch was cancelled from outside.
    Cancelled,
}

impl<E> JoinError<E> {
    /// The failures that caused the join to fail. Empty for
    /// [`JoinError::Cancelled`].
    pub fn failures(&self) -> &[E] {
        match self {
            JoinError::Failed(err) => slice::from_ref(err),
            JoinError::Aggregate(errs) => errs.as_slice(),
            JoinError::Cancelled => &[],
        }
    }

    /// Take the failures that caused the join to fail.
    pub fn into_failures(self) -> Vec<E> {
        match self {
            JoinError::Failed(err) => vec![err],
            JoinError::Aggregate(errs) => errs.into_inner(),
            JoinError::Cancelled => Vec::new(),
        }
    }

    /// Returns `true` if the batch was cancelled without any failures of its own.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, JoinError::Cancelled)
    }
}

impl<E: fmt::Debug> fmt::Debug for JoinError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
            JoinError::Aggregate(errs) => f.debug_tuple("Aggregate").field(errs).finish(),
            JoinError::Cancelled => f.write_str("Cancelled"),
        }
    }
}

impl<E: fmt::Display> fmt::Display for JoinError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::Failed(err) => fmt::Display::fmt(err, f),
            JoinError::Aggregate(errs) => fmt::Display::fmt(errs, f),
            JoinError::Cancelled => f.write_str("operations were cancelled"),
        }
    }
}

impl<E: Error + 'static> Error for JoinError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            JoinError::Failed(err) => Some(err),
            JoinError::Aggregate(errs) => Some(errs),
            JoinError::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    #[test]
    fn aggregate_formatting() {
        let err = AggregateError::new(vec!["a", "b"]);
        assert_eq!(err.to_string(), "2 errors occurred");
        assert_eq!(
            format!("{err:?}"),
            "2 errors occurred:\n- Error 1: \"a\"\n- Error 2: \"b\"\n"
        );
    }

    #[test]
    fn failures_view() {
        let one = JoinError::Failed(io::Error::other("oh no"));
        assert_eq!(one.failures().len(), 1);
        assert_eq!(one.to_string(), "oh no");
        assert!(one.source().is_some());

        let many = JoinError::Aggregate(AggregateError::new(vec![1, 2, 3]));
        assert_eq!(many.failures(), &[1, 2, 3]);
        assert_eq!(many.into_failures(), vec![1, 2, 3]);

        let cancelled = JoinError::<u8>::Cancelled;
        assert!(cancelled.is_cancelled());
        assert!(cancelled.failures().is_empty());
    }
}
