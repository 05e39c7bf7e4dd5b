use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::stream::{FusedStream, Stream};

use super::CompletionQueue;
use crate::cancel::CancellationSignal;
use crate::utils::{lock, WaiterKey};
use crate::Error;

/// A stream over the settled outputs of a [`CompletionQueue`], in the order
/// they settled.
///
/// This `struct` is created by [`CompletionQueue::drain`]. See its
/// documentation for more.
#[must_use = "streams do nothing unless polled"]
pub struct Drain<T> {
    queue: CompletionQueue<T>,
    cancellation: Option<CancellationSignal>,
    /// Our registration with the queue's suspended consumers.
    consumer_key: Option<WaiterKey>,
    /// Our registration with the cancellation signal.
    cancellation_key: Option<WaiterKey>,
    done: bool,
}

impl<T> Drain<T> {
    pub(super) fn new(queue: CompletionQueue<T>, cancellation: Option<CancellationSignal>) -> Self {
        Self {
            queue,
            cancellation,
            consumer_key: None,
            cancellation_key: None,
            done: false,
        }
    }

    /// Stop waiting on the queue. If we were picked to take an output but are
    /// leaving without it, pass the wakeup on to another consumer.
    fn leave_queue(&mut self) {
        if self.consumer_key.is_none() {
            return;
        }
        let forwarded = {
            let mut state = lock(&self.queue.shared.state);
            let was_waiting = state.consumers.remove(&mut self.consumer_key);
            if !was_waiting && !state.ready.is_empty() {
                state.consumers.take_one()
            } else {
                None
            }
        };
        if let Some(waker) = forwarded {
            waker.wake();
        }
    }

    fn leave_signal(&mut self) {
        if let Some(signal) = &self.cancellation {
            signal.unregister(&mut self.cancellation_key);
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.leave_queue();
        self.leave_signal();
    }
}

impl<T> Stream for Drain<T> {
    type Item = Result<T, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        if let Some(signal) = &this.cancellation {
            if signal
                .poll_triggered(&mut this.cancellation_key, cx)
                .is_ready()
            {
                this.finish();
                return Poll::Ready(Some(Err(Error::Cancelled)));
            }
        }

        let mut state = lock(&this.queue.shared.state);
        if let Some(output) = state.ready.pop_front() {
            state.consumers.remove(&mut this.consumer_key);
            return Poll::Ready(Some(Ok(output)));
        }

        if state.output_closed {
            state.consumers.remove(&mut this.consumer_key);
            drop(state);
            this.finish();
            return Poll::Ready(None);
        }

        state.consumers.register(&mut this.consumer_key, cx.waker());
        Poll::Pending
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, None)
        }
    }
}

impl<T> FusedStream for Drain<T> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl<T> Drop for Drain<T> {
    fn drop(&mut self) {
        self.leave_queue();
        self.leave_signal();
    }
}

impl<T> fmt::Debug for Drain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drain")
            .field("cancellable", &self.cancellation.is_some())
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures_lite::future::{self, block_on};
    use futures_lite::StreamExt;

    #[test]
    fn suspends_until_settled() {
        block_on(async {
            let queue = CompletionQueue::new();
            let (sender, receiver) = futures::channel::oneshot::channel::<u32>();
            let submitted = queue.submit(async move { receiver.await.unwrap() }).unwrap();
            queue.close_for_input();

            let mut drain = queue.drain(None);
            assert!(future::poll_once(drain.next()).await.is_none());

            sender.send(7).unwrap();
            submitted.await;
            assert_eq!(drain.next().await, Some(Ok(7)));
            assert_eq!(drain.next().await, None);
            assert!(drain.is_terminated());
        })
    }

    #[test]
    fn cancellation_leaves_outputs_in_place() {
        block_on(async {
            let queue = CompletionQueue::new();
            queue.submit(future::ready(1)).unwrap().await;
            queue.submit(future::ready(2)).unwrap().await;
            queue.close_for_input();

            let signal = CancellationSignal::new();
            signal.trigger();
            let mut cancelled = queue.drain(Some(signal));
            assert_eq!(cancelled.next().await, Some(Err(Error::Cancelled)));
            assert_eq!(cancelled.next().await, None);

            assert_eq!(queue.len(), 2);
            let rest: Vec<_> = queue.drain(None).collect().await;
            assert_eq!(rest, [Ok(1), Ok(2)]);
        })
    }

    #[test]
    fn dropped_consumer_forwards_wakeup() {
        block_on(async {
            let queue = CompletionQueue::new();
            let mut first = queue.drain(None);
            let mut second = queue.drain(None);
            assert!(future::poll_once(first.next()).await.is_none());
            assert!(future::poll_once(second.next()).await.is_none());

            queue.submit(future::ready("x")).unwrap().await;
            assert_eq!(lock(&queue.shared.state).consumers.len(), 1);

            // Whichever drain was picked, dropping `first` must leave exactly
            // one suspended consumer around to be told about "x".
            drop(first);
            assert_eq!(lock(&queue.shared.state).consumers.len(), 0);

            queue.close_for_input();
            assert_eq!(second.next().await, Some(Ok("x")));
            assert_eq!(second.next().await, None);
        })
    }
}
