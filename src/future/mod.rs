//! Joining batches of fallible operations.
//!
//! # Examples
//!
//! ```
//! use futures_completion::cancel::CancellationSignal;
//! use futures_completion::prelude::*;
//! use futures_lite::future::block_on;
//! use std::future;
//! use std::io;
//!
//! fn main() {
//!     block_on(async {
//!         let signal = CancellationSignal::new();
//!         let a = future::ready(Ok::<(), io::Error>(()));
//!         let b = future::ready(Ok(()));
//!         assert!([a, b].join_fail_fast(&signal).await.is_ok());
//!         assert!(!signal.is_triggered());
//!     })
//! }
//! ```
//!
//! # Fail-fast joins
//!
//! `try_join`-style combinators short-circuit on the first error by dropping
//! the futures that are still running. That is not always an option: the
//! remaining work may hold resources it needs to release, or may be running
//! as a spawned task that cannot be dropped from here. [`JoinFailFast`]
//! instead asks the remaining operations to stop through a shared
//! [`CancellationSignal`](crate::cancel::CancellationSignal), and then waits
//! for every one of them to settle.
//!
//! | Name           | Return signature             | When does it return?     |
//! | ---            | ---                          | ---                      |
//! | `JoinFailFast` | `Result<(), JoinError<E>>`   | Wait for all to settle, cancel the rest on first `Err`
//!
pub use fail_fast::{join_fail_fast, AggregateError, FailFastJoin, JoinError, JoinFailFast};

mod fail_fast;
