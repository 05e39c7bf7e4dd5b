//! Pin safety tests for futures driven by `Submitted` and `FailFastJoin`.

use std::{
    future::Future,
    marker::PhantomPinned,
    pin::Pin,
    task::{Context, Poll},
};

use futures::TryStreamExt;
use futures_completion::cancel::{CancellationSignal, Cancelled};
use futures_completion::prelude::*;
use futures_completion::CompletionQueue;

/// A future which asserts it is never moved between polls.
struct PinCheckFuture {
    self_ptr: Option<*const Self>,
    remaining: usize,
    _pinned: PhantomPinned,
}

impl PinCheckFuture {
    fn polls(polls: usize) -> Self {
        Self {
            self_ptr: None,
            remaining: polls,
            _pinned: PhantomPinned,
        }
    }
}

impl Future for PinCheckFuture {
    type Output = usize;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<usize> {
        let this = unsafe { self.get_unchecked_mut() };
        let current = this as *const Self;
        let stored = *this.self_ptr.get_or_insert(current);
        assert_eq!(stored, current, "moved after pinning");

        if this.remaining > 0 {
            this.remaining -= 1;
            cx.waker().wake_by_ref();
            Poll::Pending
        } else {
            Poll::Ready(this.remaining)
        }
    }
}

#[test]
fn submitted_does_not_move_its_operation() {
    futures_lite::future::block_on(async {
        let queue = CompletionQueue::new();
        let submitted: Vec<_> = (0..20)
            .map(|i| Box::pin(queue.submit(PinCheckFuture::polls(i)).unwrap()))
            .collect();
        queue.close_for_input();

        futures::future::join_all(submitted).await;
        let out: Vec<_> = queue.drain(None).try_collect().await.unwrap();
        assert_eq!(out.len(), 20);
    });
}

#[test]
fn fail_fast_join_does_not_move_its_operations() {
    futures_lite::future::block_on(async {
        let signal = CancellationSignal::new();
        let operations: Vec<_> = (0..20)
            .map(|i| async move {
                PinCheckFuture::polls(i).await;
                Ok::<(), Cancelled>(())
            })
            .collect();

        let res = operations.join_fail_fast(&signal).await;
        assert!(res.is_ok());
    });
}
