use crate::cancel::{CancellationSignal, Interrupted};

use core::future::{Future, IntoFuture};

pub use error::{AggregateError, JoinError};
pub use vec::FailFastJoin;

pub(crate) mod array;
mod error;
pub(crate) mod vec;

/// Wait for all futures to complete, cancelling the rest as soon as one fails.
///
/// Every operation is expected to observe the same [`CancellationSignal`] at
/// its own suspension points. When an operation resolves with an error that
/// is not a cancellation, the signal is triggered from within that same poll
/// so its siblings can wind down. The join itself never drops an operation
/// early: it waits for each one to settle and then reports every failure it
/// saw.
pub trait JoinFailFast {
    /// The error type of the operations.
    type Error;

    /// Which kind of future are we turning this into?
    type Future: Future<Output = Result<(), JoinError<Self::Error>>>;

    /// Wait for every operation to settle, triggering `signal` on the first
    /// failure.
    ///
    /// Resolves to:
    ///
    /// - `Ok(())` if every operation succeeded, including when there were
    ///   none. The signal is left alone.
    /// - [`JoinError::Failed`] if exactly one operation failed.
    /// - [`JoinError::Aggregate`] if several did, in the order they settled.
    /// - [`JoinError::Cancelled`] if nothing failed but at least one operation
    ///   stopped because the signal was triggered from outside the batch.
    ///
    /// The signal is guaranteed to be triggered when this returns a failure.
    fn join_fail_fast(self, signal: &CancellationSignal) -> Self::Future;
}

/// Wait for all operations in `operations` to complete, cancelling the rest
/// through `signal` as soon as one fails.
///
/// See [`JoinFailFast::join_fail_fast`] for the exact semantics.
///
/// # Examples
///
/// ```
/// use futures_completion::cancel::{CancellationSignal, Failure};
/// use futures_completion::future::{join_fail_fast, JoinError};
/// use futures_lite::future::{block_on, pending, FutureExt};
///
/// block_on(async {
///     let signal = CancellationSignal::new();
///
///     let failing = async { Err::<(), _>(Failure::Failed("oh no")) };
///     let waiting = {
///         let signal = signal.clone();
///         async move {
///             signal.run_until_cancelled(pending::<()>()).await?;
///             Ok::<(), Failure<&str>>(())
///         }
///     };
///
///     let operations = vec![failing.boxed(), waiting.boxed()];
///     let res = join_fail_fast(operations, &signal).await;
///
///     assert!(matches!(res, Err(JoinError::Failed(Failure::Failed("oh no")))));
///     assert!(signal.is_triggered());
/// })
/// ```
pub fn join_fail_fast<I, E>(
    operations: I,
    signal: &CancellationSignal,
) -> FailFastJoin<<I::Item as IntoFuture>::IntoFuture, E>
where
    I: IntoIterator,
    I::Item: IntoFuture<Output = Result<(), E>>,
    E: Interrupted,
{
    FailFastJoin::new(
        operations
            .into_iter()
            .map(IntoFuture::into_future)
            .collect(),
        signal,
    )
}
