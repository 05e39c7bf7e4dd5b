use criterion::async_executor::FuturesExecutor;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use futures_completion::cancel::{CancellationSignal, Cancelled};
use futures_completion::prelude::*;
use futures_completion::CompletionQueue;
use futures_lite::prelude::*;

mod utils;

fn completion_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("completion_queue::drain");
    for i in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(i), i, |b, i| {
            b.to_async(FuturesExecutor).iter(|| async {
                let queue = CompletionQueue::with_capacity(*i);
                let submitted: Vec<_> = utils::futures_vec(*i)
                    .into_iter()
                    .map(|fut| queue.submit(fut).unwrap())
                    .collect();
                queue.close_for_input();

                let drive = futures::future::join_all(submitted);
                let consume = queue.drain(None).count();
                let (_, count) = futures_lite::future::zip(drive, consume).await;
                assert_eq!(count, *i);
            })
        });
    }
    group.finish();
}

fn join_fail_fast(c: &mut Criterion) {
    let mut group = c.benchmark_group("future::join_fail_fast");
    for i in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(i), i, |b, i| {
            b.to_async(FuturesExecutor).iter(|| async {
                let signal = CancellationSignal::new();
                let operations: Vec<_> = utils::futures_vec(*i)
                    .into_iter()
                    .map(|fut| async move {
                        fut.await;
                        Ok::<(), Cancelled>(())
                    })
                    .collect();
                assert!(operations.join_fail_fast(&signal).await.is_ok());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, completion_queue, join_fail_fast);
criterion_main!(benches);
