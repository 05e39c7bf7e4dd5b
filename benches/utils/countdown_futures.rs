use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use super::shuffle;

/// Parked wakers by index, plus how many futures have finished so far.
struct Turns {
    parked: Vec<Option<Waker>>,
    finished: usize,
}

/// Futures which complete in index order, regardless of the order they are
/// polled in.
pub fn futures_vec(len: usize) -> Vec<CountdownFuture> {
    let turns = Rc::new(RefCell::new(Turns {
        parked: (0..len).map(|_| None).collect(),
        finished: 0,
    }));
    let mut futures: Vec<_> = (0..len)
        .map(|index| CountdownFuture {
            index,
            turns: turns.clone(),
        })
        .collect();
    shuffle(&mut futures);
    futures
}

/// Resolves to its index once every lower index has resolved.
pub struct CountdownFuture {
    index: usize,
    turns: Rc<RefCell<Turns>>,
}

impl Future for CountdownFuture {
    type Output = usize;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut turns = self.turns.borrow_mut();
        if turns.finished < self.index {
            turns.parked[self.index] = Some(cx.waker().clone());
            return Poll::Pending;
        }

        turns.finished = turns.finished.max(self.index + 1);
        let next = turns.parked.get_mut(self.index + 1).and_then(Option::take);
        drop(turns);
        if let Some(waker) = next {
            waker.wake();
        }
        Poll::Ready(self.index)
    }
}
