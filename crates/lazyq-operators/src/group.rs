//! Lazy group-by: drains the source into a lookup on the first advance, then
//! yields the groupings in first-seen key order. Null keys form a group of
//! their own.

use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::vec;

use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator};
use lazyq_core::error::Result;
use lazyq_core::hash::KeyEquality;
use lazyq_core::trace;
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::upstream::Upstream;
use lazyq_lookup::{ElementFn, Grouping, KeyFn, LookupBuilder};
use tokio_util::sync::CancellationToken;

pub struct GroupBy<S: AsyncSequence, K, E, Q> {
    source: Arc<S>,
    key_selector: KeyFn<S::Item, K>,
    element_selector: ElementFn<S::Item, E>,
    equality: Q,
    config: QueryConfig,
}

impl<S: AsyncSequence, K, E, Q: Clone> Clone for GroupBy<S, K, E, Q> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            key_selector: Arc::clone(&self.key_selector),
            element_selector: Arc::clone(&self.element_selector),
            equality: self.equality.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: AsyncSequence, K, E, Q> GroupBy<S, K, E, Q> {
    pub(crate) fn new(
        source: S,
        key_selector: KeyFn<S::Item, K>,
        element_selector: ElementFn<S::Item, E>,
        equality: Q,
        cfg: &QueryConfig,
    ) -> Self {
        Self {
            source: Arc::new(source),
            key_selector,
            element_selector,
            equality,
            config: cfg.clone(),
        }
    }
}

enum GroupPhase<T, K, E, Q> {
    Building(LookupBuilder<T, K, E, Q>),
    Yielding(vec::IntoIter<Grouping<K, E>>),
    Done,
}

struct GroupByLogic<S: AsyncSequence, K, E, Q> {
    upstream: Upstream<S>,
    phase: GroupPhase<S::Item, K, E, Q>,
}

impl<S, K, E, Q> StageLogic for GroupByLogic<S, K, E, Q>
where
    S: AsyncSequence,
    K: Send,
    E: Send,
    Q: KeyEquality<K>,
{
    type Item = Grouping<K, E>;
    const NAME: &'static str = "group_by";

    fn open(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.upstream.open(cancel);
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<Grouping<K, E>>>> {
        loop {
            match &mut self.phase {
                GroupPhase::Building(builder) => {
                    if let Some(handle) = self.upstream.handle_mut() {
                        ready!(builder.poll_fill(cx, handle))?;
                    }
                    self.upstream.release();
                    let phase = std::mem::replace(&mut self.phase, GroupPhase::Done);
                    if let GroupPhase::Building(builder) = phase {
                        let lookup = builder.finish();
                        trace::index_built(Self::NAME, lookup.len());
                        self.phase = GroupPhase::Yielding(lookup.into_groupings().into_iter());
                    }
                }
                GroupPhase::Yielding(groups) => return Poll::Ready(Ok(groups.next())),
                GroupPhase::Done => return Poll::Ready(Ok(None)),
            }
        }
    }

    fn release(&mut self) {
        self.upstream.release();
        self.phase = GroupPhase::Done;
    }
}

impl<S, K, E, Q> AsyncSequence for GroupBy<S, K, E, Q>
where
    S: AsyncSequence + 'static,
    K: Send + 'static,
    E: Send + 'static,
    Q: KeyEquality<K> + Clone + 'static,
{
    type Item = Grouping<K, E>;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<Grouping<K, E>> {
        let builder = LookupBuilder::new(
            Arc::clone(&self.key_selector),
            Arc::clone(&self.element_selector),
            self.equality.clone(),
            &self.config,
        );
        let logic = GroupByLogic {
            upstream: Upstream::new(Arc::clone(&self.source)),
            phase: GroupPhase::Building(builder),
        };
        Box::new(Stage::new(logic, cancel))
    }
}
