use super::error::{AggregateError, JoinError};
use super::JoinFailFast as JoinFailFastTrait;
use crate::cancel::{CancellationSignal, Interrupted};

use core::fmt;
use core::future::{Future, IntoFuture};
use core::mem;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_buffered::FuturesUnordered;
use futures_core::Stream;
use futures_lite::ready;
use pin_project::pin_project;

/// A future which waits for every operation to settle, cancelling the rest of
/// the batch as soon as one of them fails.
///
/// This `struct` is created by the [`join_fail_fast`] method on the
/// [`JoinFailFast`] trait. See its documentation for more.
///
/// [`join_fail_fast`]: crate::future::JoinFailFast::join_fail_fast
/// [`JoinFailFast`]: crate::future::JoinFailFast
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct FailFastJoin<Fut, E>
where
    Fut: Future<Output = Result<(), E>>,
    E: Interrupted,
{
    /// A boolean which holds whether the future has completed
    consumed: bool,
    /// The operations which have not settled yet.
    #[pin]
    operations: FuturesUnordered<Observed<Fut>>,
    signal: CancellationSignal,
    /// Failures in the order they settled.
    failures: Vec<E>,
    /// How many operations stopped because they observed the signal.
    cancelled: usize,
}

impl<Fut, E> FailFastJoin<Fut, E>
where
    Fut: Future<Output = Result<(), E>>,
    E: Interrupted,
{
    pub(crate) fn new(operations: Vec<Fut>, signal: &CancellationSignal) -> Self {
        let mut group = FuturesUnordered::new();
        for operation in operations {
            group.push(Observed {
                operation,
                signal: signal.clone(),
            });
        }
        Self {
            consumed: false,
            operations: group,
            signal: signal.clone(),
            failures: Vec::new(),
            cancelled: 0,
        }
    }
}

impl<Fut, E> JoinFailFastTrait for Vec<Fut>
where
    Fut: IntoFuture<Output = Result<(), E>>,
    E: Interrupted,
{
    type Error = E;
    type Future = FailFastJoin<Fut::IntoFuture, E>;

    fn join_fail_fast(self, signal: &CancellationSignal) -> Self::Future {
        FailFastJoin::new(
            self.into_iter().map(IntoFuture::into_future).collect(),
            signal,
        )
    }
}

impl<Fut, E> fmt::Debug for FailFastJoin<Fut, E>
where
    Fut: Future<Output = Result<(), E>>,
    E: Interrupted,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailFastJoin")
            .field("pending", &self.operations.len())
            .field("failed", &self.failures.len())
            .field("cancelled", &self.cancelled)
            .field("signal", &self.signal)
            .finish()
    }
}

impl<Fut, E> Future for FailFastJoin<Fut, E>
where
    Fut: Future<Output = Result<(), E>>,
    E: Interrupted,
{
    type Output = Result<(), JoinError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        assert!(
            !*this.consumed,
            "Futures must not be polled after completing"
        );

        while let Some(output) = ready!(this.operations.as_mut().poll_next(cx)) {
            match output {
                Ok(()) => {}
                Err(err) if err.is_cancelled() => *this.cancelled += 1,
                Err(err) => this.failures.push(err),
            }
        }

        *this.consumed = true;
        let mut failures = mem::take(this.failures);
        let outcome = if failures.len() > 1 {
            Err(JoinError::Aggregate(AggregateError::new(failures)))
        } else if let Some(err) = failures.pop() {
            Err(JoinError::Failed(err))
        } else if *this.cancelled > 0 {
            Err(JoinError::Cancelled)
        } else {
            Ok(())
        };

        if matches!(outcome, Err(JoinError::Failed(_) | JoinError::Aggregate(_))) {
            this.signal.trigger();
        }
        Poll::Ready(outcome)
    }
}

/// Wraps a single operation so that its failure triggers the signal from
/// within the very poll that observed it.
#[pin_project]
struct Observed<Fut> {
    #[pin]
    operation: Fut,
    signal: CancellationSignal,
}

impl<Fut, E> Future for Observed<Fut>
where
    Fut: Future<Output = Result<(), E>>,
    E: Interrupted,
{
    type Output = Result<(), E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let output = ready!(this.operation.poll(cx));
        if let Err(err) = &output {
            if !err.is_cancelled() {
                let first = this.signal.trigger();
                tracing::warn!(first, "operation failed, cancelling the rest of the batch");
            }
        }
        Poll::Ready(output)
    }
}
