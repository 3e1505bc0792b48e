//! N-ary set union.
//!
//! One `KeySet` per enumeration is shared by every source of the chain, so an
//! element is yielded the first time it is seen (chain order, then element
//! order) and never again. `union` on a `Union` extends the chain under the
//! chain's equality; a union with a different equality goes through
//! `SequenceExt::union_with` and nests. Past the chain ceiling the sealed
//! chain becomes a plain concat child, still deduplicated by the outer set.

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator, SharedSequence};
use lazyq_core::error::Result;
use lazyq_core::hash::KeyEquality;
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::trace;
use lazyq_lookup::KeySet;
use tokio_util::sync::CancellationToken;

use crate::chain::{ChainCursor, SourceChain};
use crate::concat::Concat;

pub struct Union<T: Send + 'static, Q> {
    chain: SourceChain<T>,
    equality: Q,
    config: QueryConfig,
}

impl<T: Send + 'static, Q: Clone> Clone for Union<T, Q> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            equality: self.equality.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T, Q> Union<T, Q>
where
    T: Clone + Send + Sync + 'static,
    Q: KeyEquality<T> + Clone + 'static,
{
    pub fn new(
        first: SharedSequence<T>,
        second: SharedSequence<T>,
        equality: Q,
        cfg: &QueryConfig,
    ) -> Self {
        Self {
            chain: SourceChain::pair(first, second),
            equality,
            config: cfg.clone(),
        }
    }

    pub fn sources(&self) -> usize {
        self.chain.len()
    }

    pub fn union<S>(self, next: S) -> Union<T, Q>
    where
        S: AsyncSequence<Item = T> + 'static,
    {
        let next: SharedSequence<T> = Arc::new(next);
        match self.chain.push(Arc::clone(&next), self.config.max_chain_len) {
            Some(chain) => Union {
                chain,
                equality: self.equality,
                config: self.config,
            },
            None => {
                // The sealed chain nests as a plain concat so that only this
                // node deduplicates, through a single set.
                trace::chain_fallback("union", self.chain.len());
                let sealed = Concat::from_chain(self.chain, self.config.max_chain_len);
                Union {
                    chain: SourceChain::pair(Arc::new(sealed), next),
                    equality: self.equality,
                    config: self.config,
                }
            }
        }
    }
}

struct UnionLogic<T, Q> {
    cursor: ChainCursor<T>,
    seen: KeySet<T, Q>,
}

impl<T, Q> StageLogic for UnionLogic<T, Q>
where
    T: Clone + Send + 'static,
    Q: KeyEquality<T>,
{
    type Item = T;
    const NAME: &'static str = "union";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        loop {
            match ready!(self.cursor.poll_next(cx))? {
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
        self.cursor.release();
    }
}

impl<T, Q> AsyncSequence for Union<T, Q>
where
    T: Clone + Send + Sync + 'static,
    Q: KeyEquality<T> + Clone + 'static,
{
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        let logic = UnionLogic {
            cursor: ChainCursor::new(&self.chain, cancel),
            seen: KeySet::with_config(self.equality.clone(), &self.config),
        };
        Box::new(Stage::new(logic, cancel))
    }
}
