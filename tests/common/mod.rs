#![allow(dead_code)]

use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Route crate logs to the test harness. Controlled with `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An operation that resolves to `value` after `delay`.
pub async fn after<T>(delay: Duration, value: T) -> T {
    tokio::time::sleep(delay).await;
    value
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
