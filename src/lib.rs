//! Completion-ordered queues and fail-fast joins for async Rust.
//!
//! This library provides two independent coordination primitives:
//!
//! - [`CompletionQueue`]: producers submit in-flight operations, consumers
//!   drain their outputs in the order the operations *finished*, not the
//!   order they were submitted in.
//! - [`future::JoinFailFast`]: wait for a batch of fallible operations,
//!   cancelling the rest through a shared [`cancel::CancellationSignal`] as
//!   soon as one of them fails, and report every failure.
//!
//! Neither spawns threads or depends on a particular executor.
//!
//! # Examples
//!
//! Consume operations in the order they complete:
//! ```rust
//! use futures_completion::CompletionQueue;
//! use futures_lite::future::{block_on, yield_now};
//! use futures_lite::StreamExt;
//!
//! block_on(async {
//!     let queue = CompletionQueue::new();
//!     let slow = queue.submit(async { yield_now().await; "slow" }).unwrap();
//!     let fast = queue.submit(async { "fast" }).unwrap();
//!     queue.close_for_input();
//!
//!     futures_lite::future::zip(slow, fast).await;
//!
//!     let mut drain = queue.drain(None);
//!     assert_eq!(drain.next().await, Some(Ok("fast")));
//!     assert_eq!(drain.next().await, Some(Ok("slow")));
//!     assert_eq!(drain.next().await, None);
//! })
//! ```
//!
//! # Cancellation
//!
//! Cancellation is cooperative. Triggering a signal never drops or aborts a
//! future; operations observe the signal at their own suspension points, for
//! example through [`cancel::CancellationSignal::run_until_cancelled`].

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod error;
mod queue;
mod utils;

/// The futures completion prelude.
pub mod prelude {
    pub use super::future::JoinFailFast as _;
}

pub mod cancel;
pub mod future;

pub use error::Error;
pub use queue::{CompletionQueue, Drain, Submitted};
