//! Hash joins over a lookup built from the inner sequence.
//!
//! Both joins pull the first outer element before touching the inner
//! sequence: an empty outer never enumerates the inner. The inner index is
//! built with join semantics (null keys dropped), once per enumeration, and
//! dropped when the stage releases.

mod group;
mod hash;

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::AsyncSequence;
use lazyq_core::error::Result;
use lazyq_core::hash::KeyEquality;
use lazyq_core::trace;
use lazyq_core::upstream::Upstream;
use lazyq_lookup::{ElementFn, KeyFn, Lookup, LookupBuilder};
use tokio_util::sync::CancellationToken;

pub use group::{GroupJoin, GroupJoinFn};
pub use hash::{Join, JoinFn};

/// Resume point shared by both join stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinPhase {
    /// Waiting for the first outer element.
    Start,
    /// Draining the inner sequence into the index.
    Building,
    /// Matching outer elements against the finished index.
    Probing,
    Done,
}

/// The inner side of a join: its handle while building, then the index.
struct InnerIndex<I: AsyncSequence, K, Q> {
    upstream: Upstream<I>,
    builder: Option<LookupBuilder<I::Item, K, I::Item, Q>>,
    lookup: Option<Lookup<K, I::Item, Q>>,
}

impl<I, K, Q> InnerIndex<I, K, Q>
where
    I: AsyncSequence,
    Q: KeyEquality<K>,
{
    fn new(upstream: Upstream<I>) -> Self {
        Self {
            upstream,
            builder: None,
            lookup: None,
        }
    }

    fn start(
        &mut self,
        key_selector: KeyFn<I::Item, K>,
        equality: Q,
        cfg: &QueryConfig,
        cancel: &CancellationToken,
    ) {
        let identity: ElementFn<I::Item, I::Item> = Arc::new(|item: I::Item| item);
        self.builder = Some(LookupBuilder::new(key_selector, identity, equality, cfg).for_join());
        self.upstream.open(cancel);
    }

    /// `stage` labels the index event with the owning operator.
    fn poll_build(&mut self, cx: &mut Context<'_>, stage: &'static str) -> Poll<Result<()>> {
        if let (Some(builder), Some(handle)) = (self.builder.as_mut(), self.upstream.handle_mut()) {
            ready!(builder.poll_fill(cx, handle))?;
        }
        self.upstream.release();
        self.lookup = self.builder.take().map(LookupBuilder::finish);
        if let Some(lookup) = &self.lookup {
            trace::index_built(stage, lookup.len());
        }
        Poll::Ready(Ok(()))
    }

    fn lookup(&self) -> Option<&Lookup<K, I::Item, Q>> {
        self.lookup.as_ref()
    }

    fn release(&mut self) {
        self.upstream.release();
        self.builder = None;
        self.lookup = None;
    }
}
