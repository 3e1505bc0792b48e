//! N-ary concatenation.
//!
//! `concat` on a `Concat` extends its chain by one node instead of nesting.
//! Past `max_chain_len` sources the chain is sealed and the whole concat
//! becomes the left child of a fresh two-source chain.

use std::sync::Arc;
use std::task::{Context, Poll};

use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator, SharedSequence};
use lazyq_core::error::Result;
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::trace;
use tokio_util::sync::CancellationToken;

use crate::chain::{ChainCursor, SourceChain};

pub struct Concat<T: Send + 'static> {
    chain: SourceChain<T>,
    max_len: usize,
}

impl<T: Send + 'static> Clone for Concat<T> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            max_len: self.max_len,
        }
    }
}

impl<T: Send + 'static> Concat<T> {
    pub fn new(first: SharedSequence<T>, second: SharedSequence<T>, cfg: &QueryConfig) -> Self {
        Self {
            chain: SourceChain::pair(first, second),
            max_len: cfg.max_chain_len,
        }
    }

    /// Plain concatenation over an existing chain.
    pub(crate) fn from_chain(chain: SourceChain<T>, max_len: usize) -> Self {
        Self { chain, max_len }
    }

    /// Number of sources in the chain.
    pub fn sources(&self) -> usize {
        self.chain.len()
    }

    pub fn concat<S>(self, next: S) -> Concat<T>
    where
        S: AsyncSequence<Item = T> + 'static,
    {
        let next: SharedSequence<T> = Arc::new(next);
        match self.chain.push(Arc::clone(&next), self.max_len) {
            Some(chain) => Concat {
                chain,
                max_len: self.max_len,
            },
            None => {
                trace::chain_fallback("concat", self.chain.len());
                let max_len = self.max_len;
                Concat {
                    chain: SourceChain::pair(Arc::new(self), next),
                    max_len,
                }
            }
        }
    }
}

struct ConcatLogic<T> {
    cursor: ChainCursor<T>,
}

impl<T: Send + 'static> StageLogic for ConcatLogic<T> {
    type Item = T;
    const NAME: &'static str = "concat";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        self.cursor.poll_next(cx)
    }

    fn release(&mut self) {
        self.cursor.release();
    }
}

impl<T: Send + 'static> AsyncSequence for Concat<T> {
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        let logic = ConcatLogic {
            cursor: ChainCursor::new(&self.chain, cancel),
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        self.chain.len_hint()
    }
}
