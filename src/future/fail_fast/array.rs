use super::vec::FailFastJoin;
use super::JoinFailFast as JoinFailFastTrait;
use crate::cancel::{CancellationSignal, Interrupted};

use core::future::IntoFuture;

impl<Fut, E, const N: usize> JoinFailFastTrait for [Fut; N]
where
    Fut: IntoFuture<Output = Result<(), E>>,
    E: Interrupted,
{
    type Error = E;
    type Future = FailFastJoin<Fut::IntoFuture, E>;

    fn join_fail_fast(self, signal: &CancellationSignal) -> Self::Future {
        FailFastJoin::new(
            self.into_iter().map(IntoFuture::into_future).collect(),
            signal,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cancel::Failure;
    use crate::future::JoinError;
    use std::future;

    #[test]
    fn aggregates_every_failure() {
        futures_lite::future::block_on(async {
            let signal = CancellationSignal::new();
            let res = [
                future::ready(Err(Failure::Failed("a"))),
                future::ready(Ok(())),
                future::ready(Err(Failure::Failed("b"))),
            ]
            .join_fail_fast(&signal)
            .await;

            let Err(JoinError::Aggregate(errs)) = res else {
                panic!("expected an aggregate error");
            };
            assert_eq!(errs.len(), 2);
            assert!(errs.contains(&Failure::Failed("a")));
            assert!(errs.contains(&Failure::Failed("b")));
            assert!(signal.is_triggered());
        })
    }
}
