use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_lite::ready;
use pin_project::{pin_project, pinned_drop};

use super::CompletionQueue;

/// A future which drives a submitted operation and records its output in a
/// [`CompletionQueue`] as soon as it resolves.
///
/// This `struct` is created by [`CompletionQueue::submit`]. See its
/// documentation for more.
#[must_use = "submitted operations never settle unless the returned future is polled"]
#[pin_project(PinnedDrop)]
pub struct Submitted<F: Future> {
    #[pin]
    operation: F,
    /// The queue to settle into; taken once the operation has settled.
    queue: Option<CompletionQueue<F::Output>>,
}

impl<F: Future> Submitted<F> {
    pub(super) fn new(operation: F, queue: CompletionQueue<F::Output>) -> Self {
        Self {
            operation,
            queue: Some(queue),
        }
    }
}

impl<F: Future> fmt::Debug for Submitted<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submitted")
            .field("settled", &self.queue.is_none())
            .finish()
    }
}

impl<F: Future> Future for Submitted<F> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        assert!(
            this.queue.is_some(),
            "Futures must not be polled after completing"
        );

        let output = ready!(this.operation.poll(cx));
        if let Some(queue) = this.queue.take() {
            queue.settle(output);
        }
        Poll::Ready(())
    }
}

/// Release the in-flight slot of an operation that never settled.
#[pinned_drop]
impl<F: Future> PinnedDrop for Submitted<F> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if let Some(queue) = this.queue.take() {
            queue.abandon();
        }
    }
}
