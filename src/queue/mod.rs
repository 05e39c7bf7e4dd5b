//! A multi-producer, multi-consumer queue of operations, ordered by completion.
//!
//! Producers [`submit`](CompletionQueue::submit) futures and receive a
//! [`Submitted`] tracking future in return, which they spawn onto whatever
//! executor they like. The moment a tracked future resolves, its output is
//! pushed onto the queue from within that same poll. Consumers read outputs
//! through one or more [`Drain`] streams, in the order the operations
//! finished.
//!
//! # Examples
//!
//! ```
//! use futures_completion::CompletionQueue;
//! use futures_lite::{future, StreamExt};
//!
//! # future::block_on(async {
//! let queue = CompletionQueue::new();
//! let a = queue.submit(future::ready("a")).unwrap();
//! let b = queue.submit(future::ready("b")).unwrap();
//! queue.close_for_input();
//!
//! // `b` is driven first, so it settles first.
//! b.await;
//! a.await;
//!
//! let outputs: Vec<_> = queue.drain(None).map(Result::unwrap).collect().await;
//! assert_eq!(outputs, ["b", "a"]);
//! assert!(queue.is_fully_complete());
//! # })
//! ```

use core::fmt;
use core::future::IntoFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::cancel::CancellationSignal;
use crate::utils::{lock, WaiterList, WakeBatch};
use crate::Error;

pub use drain::Drain;
pub use submitted::Submitted;

mod drain;
mod submitted;

/// A queue of settled operations, ordered by the time they settled.
///
/// `CompletionQueue` is a handle: clones share the same underlying queue, so
/// it can be handed to any number of producers and consumers.
pub struct CompletionQueue<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    state: Mutex<State<T>>,
}

struct State<T> {
    /// Outputs of settled operations that no consumer has taken yet.
    ready: VecDeque<T>,
    /// Operations submitted but not yet settled or abandoned.
    in_flight: usize,
    input_closed: bool,
    output_closed: bool,
    /// Drains suspended until an output arrives or the queue closes.
    consumers: WaiterList,
}

impl<T> State<T> {
    /// Close the output side once input is closed and nothing is in flight.
    /// Returns the consumers that must be woken to observe the end.
    fn close_output_if_done(&mut self) -> WakeBatch {
        if self.input_closed && self.in_flight == 0 && !self.output_closed {
            self.output_closed = true;
            tracing::debug!(pending = self.ready.len(), "completion queue closed for output");
            self.consumers.take_all()
        } else {
            WakeBatch::new()
        }
    }
}

impl<T> CompletionQueue<T> {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new, empty queue with room for `capacity` settled outputs
    /// before it reallocates.
    ///
    /// The queue is unbounded either way.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    ready: VecDeque::with_capacity(capacity),
                    in_flight: 0,
                    input_closed: false,
                    output_closed: false,
                    consumers: WaiterList::new(),
                }),
            }),
        }
    }

    /// Register an operation with the queue.
    ///
    /// Returns a future that drives `operation` and records its output in the
    /// queue the moment it resolves. Nothing is recorded unless the returned
    /// future is polled to completion, so spawn it or await it. Dropping it
    /// early abandons the operation: it stops counting as in flight and never
    /// shows up in a [`Drain`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if [`close_for_input`] has been called.
    ///
    /// [`close_for_input`]: CompletionQueue::close_for_input
    pub fn submit<F>(&self, operation: F) -> Result<Submitted<F::IntoFuture>, Error>
    where
        F: IntoFuture<Output = T>,
    {
        let operation = operation.into_future();
        {
            let mut state = lock(&self.shared.state);
            if state.input_closed {
                return Err(Error::InvalidState);
            }
            state.in_flight += 1;
        }
        Ok(Submitted::new(operation, self.clone()))
    }

    /// Declare that no further operations will be submitted.
    ///
    /// Once every operation already in flight has settled, the queue closes
    /// for output and every [`Drain`] ends after handing out what is left.
    /// Calling this more than once has no further effect.
    pub fn close_for_input(&self) {
        let wakers = {
            let mut state = lock(&self.shared.state);
            if state.input_closed {
                return;
            }
            state.input_closed = true;
            tracing::debug!(in_flight = state.in_flight, "completion queue closed for input");
            state.close_output_if_done()
        };
        wake_all(wakers);
    }

    /// Consume settled outputs in the order their operations settled.
    ///
    /// Any number of drains may run at once; each output is handed to exactly
    /// one of them. If `cancellation` is triggered, the drain yields a single
    /// [`Error::Cancelled`] and ends, leaving the remaining outputs for other
    /// drains.
    pub fn drain(&self, cancellation: Option<CancellationSignal>) -> Drain<T> {
        Drain::new(self.clone(), cancellation)
    }

    /// Whether input is closed, every operation has settled, and every output
    /// has been taken by a consumer.
    pub fn is_fully_complete(&self) -> bool {
        let state = lock(&self.shared.state);
        state.input_closed && state.in_flight == 0 && state.output_closed && state.ready.is_empty()
    }

    /// Whether [`close_for_input`](CompletionQueue::close_for_input) has been called.
    pub fn is_closed_for_input(&self) -> bool {
        lock(&self.shared.state).input_closed
    }

    /// The number of settled outputs waiting to be drained.
    pub fn len(&self) -> usize {
        lock(&self.shared.state).ready.len()
    }

    /// Returns `true` if no settled outputs are waiting to be drained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of submitted operations that have not settled yet.
    pub fn in_flight(&self) -> usize {
        lock(&self.shared.state).in_flight
    }

    /// Record the output of a settled operation.
    fn settle(&self, output: T) {
        let (consumer, closed) = {
            let mut state = lock(&self.shared.state);
            debug_assert!(!state.output_closed, "settled after the queue closed");
            state.ready.push_back(output);
            state.in_flight -= 1;
            tracing::trace!(in_flight = state.in_flight, "operation settled");
            (state.consumers.take_one(), state.close_output_if_done())
        };
        if let Some(consumer) = consumer {
            consumer.wake();
        }
        wake_all(closed);
    }

    /// Forget an operation whose tracking future was dropped before it settled.
    fn abandon(&self) {
        let wakers = {
            let mut state = lock(&self.shared.state);
            state.in_flight -= 1;
            tracing::debug!(in_flight = state.in_flight, "operation abandoned before settling");
            state.close_output_if_done()
        };
        wake_all(wakers);
    }
}

fn wake_all(wakers: WakeBatch) {
    for waker in wakers {
        waker.wake();
    }
}

impl<T> Clone for CompletionQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for CompletionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CompletionQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.shared.state);
        f.debug_struct("CompletionQueue")
            .field("ready", &state.ready.len())
            .field("in_flight", &state.in_flight)
            .field("input_closed", &state.input_closed)
            .field("output_closed", &state.output_closed)
            .field("consumers", &state.consumers.len())
            .finish()
    }
}
