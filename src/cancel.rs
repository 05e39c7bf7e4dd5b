//! Cooperative cancellation.
//!
//! A [`CancellationSignal`] is a shared flag that can be triggered from
//! anywhere and observed from anywhere. Triggering never stops a future by
//! force: work that wants to be cancellable checks the signal at its own
//! suspension points, either with [`CancellationSignal::check`] or by racing
//! against [`CancellationSignal::cancelled`].
//!
//! # Examples
//!
//! ```
//! use futures_completion::cancel::{CancellationSignal, Cancelled};
//! use futures_lite::future::block_on;
//!
//! block_on(async {
//!     let signal = CancellationSignal::new();
//!     let observer = signal.clone();
//!
//!     assert!(signal.trigger());
//!     assert!(!signal.trigger());
//!
//!     observer.cancelled().await;
//!     assert_eq!(observer.check(), Err(Cancelled));
//! })
//! ```

use core::fmt;
use core::future::{Future, IntoFuture};
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll};
use std::io;
use std::sync::{Arc, Mutex};

use pin_project::pin_project;

use crate::utils::{lock, WaiterKey, WaiterList};

/// The error returned by work that stopped because its signal was triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, thiserror::Error)]
#[error("operation was cancelled")]
pub struct Cancelled;

/// Distinguishes cooperative cancellation from a genuine failure.
///
/// [`JoinFailFast`](crate::future::JoinFailFast) uses this to decide whether
/// an error should cancel the rest of the batch, or is itself the result of
/// such a cancellation.
pub trait Interrupted {
    /// Returns `true` if this error only reports that the work was cancelled.
    fn is_cancelled(&self) -> bool;
}

impl Interrupted for Cancelled {
    fn is_cancelled(&self) -> bool {
        true
    }
}

impl Interrupted for crate::Error {
    fn is_cancelled(&self) -> bool {
        matches!(self, crate::Error::Cancelled)
    }
}

/// Always a failure, `ErrorKind::Interrupted` included. Wrap in [`Failure`]
/// to report cancellation alongside I/O errors.
impl Interrupted for io::Error {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<E> Interrupted for Failure<E> {
    fn is_cancelled(&self) -> bool {
        matches!(self, Failure::Cancelled)
    }
}

/// An operation error that is either a cancellation or a failure of type `E`.
///
/// Converts from [`Cancelled`], so operations can bail out with
/// `signal.check()?`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure<E> {
    /// The operation observed its cancellation signal and stopped.
    #[error("operation was cancelled")]
    Cancelled,
    /// The operation failed.
    #[error("{0}")]
    Failed(E),
}

impl<E> From<Cancelled> for Failure<E> {
    fn from(_: Cancelled) -> Self {
        Failure::Cancelled
    }
}

struct Inner {
    triggered: AtomicBool,
    waiters: Mutex<WaiterList>,
}

/// A shared, idempotent cancellation flag.
///
/// Cloning a signal yields another handle to the same flag.
#[derive(Clone)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

impl fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSignal {
    /// Create a new, untriggered signal.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                waiters: Mutex::new(WaiterList::new()),
            }),
        }
    }

    /// Trigger the signal, waking everything that is waiting on it.
    ///
    /// Safe to call any number of times from any number of threads. Returns
    /// `true` only for the call that actually flipped the flag.
    pub fn trigger(&self) -> bool {
        if self.inner.triggered.swap(true, Ordering::SeqCst) {
            return false;
        }

        let wakers = lock(&self.inner.waiters).take_all();
        tracing::debug!(observers = wakers.len(), "cancellation signal triggered");
        for waker in wakers {
            waker.wake();
        }
        true
    }

    /// Whether the signal has been triggered.
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` once the signal has been triggered.
    ///
    /// ```
    /// use futures_completion::cancel::{CancellationSignal, Failure};
    ///
    /// fn step(signal: &CancellationSignal) -> Result<(), Failure<std::io::Error>> {
    ///     signal.check()?;
    ///     Ok(())
    /// }
    ///
    /// let signal = CancellationSignal::new();
    /// assert!(step(&signal).is_ok());
    /// signal.trigger();
    /// assert!(matches!(step(&signal), Err(Failure::Cancelled)));
    /// ```
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_triggered() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Wait until the signal is triggered.
    pub fn cancelled(&self) -> WaitForCancellation {
        WaitForCancellation {
            signal: self.clone(),
            key: None,
        }
    }

    /// Run `future` until it completes or the signal is triggered, whichever
    /// happens first. The signal is checked before the future on every poll.
    ///
    /// ```
    /// use futures_completion::cancel::{CancellationSignal, Cancelled};
    /// use futures_lite::future::{block_on, pending};
    ///
    /// block_on(async {
    ///     let signal = CancellationSignal::new();
    ///     signal.trigger();
    ///     let res = signal.run_until_cancelled(pending::<()>()).await;
    ///     assert_eq!(res, Err(Cancelled));
    /// })
    /// ```
    pub fn run_until_cancelled<F>(&self, future: F) -> UntilCancelled<F::IntoFuture>
    where
        F: IntoFuture,
    {
        UntilCancelled {
            future: future.into_future(),
            cancelled: self.cancelled(),
        }
    }

    /// Poll for the triggered state, registering `cx` under `key` if the
    /// signal has not fired yet.
    pub(crate) fn poll_triggered(
        &self,
        key: &mut Option<WaiterKey>,
        cx: &mut Context<'_>,
    ) -> Poll<()> {
        if self.is_triggered() {
            *key = None;
            return Poll::Ready(());
        }

        let mut waiters = lock(&self.inner.waiters);
        // `trigger` flips the flag before it takes the lock, so checking again
        // under the lock rules out a missed wakeup.
        if self.is_triggered() {
            waiters.remove(key);
            return Poll::Ready(());
        }
        waiters.register(key, cx.waker());
        Poll::Pending
    }

    /// Drop the registration behind `key`, if any.
    pub(crate) fn unregister(&self, key: &mut Option<WaiterKey>) {
        if key.is_some() {
            lock(&self.inner.waiters).remove(key);
        }
    }
}

/// A future which resolves once a [`CancellationSignal`] is triggered.
///
/// Created by [`CancellationSignal::cancelled`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[derive(Debug)]
pub struct WaitForCancellation {
    signal: CancellationSignal,
    key: Option<WaiterKey>,
}

impl Future for WaitForCancellation {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.signal.poll_triggered(&mut this.key, cx)
    }
}

impl Drop for WaitForCancellation {
    fn drop(&mut self) {
        self.signal.unregister(&mut self.key);
    }
}

/// A future which runs another future until a signal is triggered.
///
/// Created by [`CancellationSignal::run_until_cancelled`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
#[derive(Debug)]
pub struct UntilCancelled<F> {
    #[pin]
    future: F,
    cancelled: WaitForCancellation,
}

impl<F: Future> Future for UntilCancelled<F> {
    type Output = Result<F::Output, Cancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if Pin::new(this.cancelled).poll(cx).is_ready() {
            return Poll::Ready(Err(Cancelled));
        }
        this.future.poll(cx).map(Ok)
    }
}
