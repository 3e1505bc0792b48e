//! First occurrence of each element under an equality.

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator};
use lazyq_core::error::Result;
use lazyq_core::hash::KeyEquality;
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::upstream::Upstream;
use lazyq_lookup::KeySet;
use tokio_util::sync::CancellationToken;

pub struct Distinct<S: AsyncSequence, Q> {
    source: Arc<S>,
    equality: Q,
    config: QueryConfig,
}

impl<S: AsyncSequence, Q: Clone> Clone for Distinct<S, Q> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            equality: self.equality.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: AsyncSequence, Q> Distinct<S, Q> {
    pub(crate) fn new(source: S, equality: Q, cfg: &QueryConfig) -> Self {
        Self {
            source: Arc::new(source),
            equality,
            config: cfg.clone(),
        }
    }
}

struct DistinctLogic<S: AsyncSequence, Q> {
    upstream: Upstream<S>,
    seen: KeySet<S::Item, Q>,
}

impl<S, Q> StageLogic for DistinctLogic<S, Q>
where
    S: AsyncSequence,
    S::Item: Clone,
    Q: KeyEquality<S::Item>,
{
    type Item = S::Item;
    const NAME: &'static str = "distinct";

    fn open(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.upstream.open(cancel);
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<S::Item>>> {
        loop {
            match ready!(self.upstream.poll_next(cx))? {
                Some(item) => {
                    if self.seen.insert(item.clone()) {
                        return Poll::Ready(Ok(Some(item)));
                    }
                }
                None => return Poll::Ready(Ok(None)),
            }
        }
    }

    fn release(&mut self) {
        self.upstream.release();
    }
}

impl<S, Q> AsyncSequence for Distinct<S, Q>
where
    S: AsyncSequence + 'static,
    S::Item: Clone,
    Q: KeyEquality<S::Item> + Clone + 'static,
{
    type Item = S::Item;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<S::Item> {
        let logic = DistinctLogic {
            upstream: Upstream::new(Arc::clone(&self.source)),
            seen: KeySet::with_config(self.equality.clone(), &self.config),
        };
        Box::new(Stage::new(logic, cancel))
    }
}
