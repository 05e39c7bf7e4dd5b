//! Utilities shared by the queue and the cancellation signal.

mod waiters;

pub(crate) use waiters::{lock, WaiterKey, WaiterList, WakeBatch};
