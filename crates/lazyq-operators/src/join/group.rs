//! Group join: exactly one result per outer element.

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator};
use lazyq_core::error::Result;
use lazyq_core::hash::KeyEquality;
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::upstream::Upstream;
use lazyq_lookup::KeyFn;
use tokio_util::sync::CancellationToken;

use super::{InnerIndex, JoinPhase};

/// Receives the outer element and its matches (empty when none).
pub type GroupJoinFn<O, I, R> = Arc<dyn Fn(O, &[I]) -> Result<R> + Send + Sync>;

pub struct GroupJoin<O: AsyncSequence, I: AsyncSequence, K, R, Q> {
    outer: Arc<O>,
    inner: Arc<I>,
    outer_key: KeyFn<O::Item, K>,
    inner_key: KeyFn<I::Item, K>,
    result: GroupJoinFn<O::Item, I::Item, R>,
    equality: Q,
    config: QueryConfig,
}

impl<O: AsyncSequence, I: AsyncSequence, K, R, Q: Clone> Clone for GroupJoin<O, I, K, R, Q> {
    fn clone(&self) -> Self {
        Self {
            outer: Arc::clone(&self.outer),
            inner: Arc::clone(&self.inner),
            outer_key: Arc::clone(&self.outer_key),
            inner_key: Arc::clone(&self.inner_key),
            result: Arc::clone(&self.result),
            equality: self.equality.clone(),
            config: self.config.clone(),
        }
    }
}

impl<O: AsyncSequence, I: AsyncSequence, K, R, Q> GroupJoin<O, I, K, R, Q> {
    pub(crate) fn new(
        outer: O,
        inner: I,
        outer_key: KeyFn<O::Item, K>,
        inner_key: KeyFn<I::Item, K>,
        result: GroupJoinFn<O::Item, I::Item, R>,
        equality: Q,
        cfg: &QueryConfig,
    ) -> Self {
        Self {
            outer: Arc::new(outer),
            inner: Arc::new(inner),
            outer_key,
            inner_key,
            result,
            equality,
            config: cfg.clone(),
        }
    }
}

struct GroupJoinLogic<O: AsyncSequence, I: AsyncSequence, K, R, Q> {
    phase: JoinPhase,
    outer: Upstream<O>,
    index: InnerIndex<I, K, Q>,
    pending: Option<O::Item>,
    outer_key: KeyFn<O::Item, K>,
    inner_key: KeyFn<I::Item, K>,
    result: GroupJoinFn<O::Item, I::Item, R>,
    equality: Q,
    config: QueryConfig,
    cancel: CancellationToken,
}

impl<O, I, K, R, Q> GroupJoinLogic<O, I, K, R, Q>
where
    O: AsyncSequence,
    I: AsyncSequence,
    Q: KeyEquality<K>,
{
    fn emit(&self, outer: O::Item) -> Result<R> {
        let key = (self.outer_key)(&outer);
        let matches = match self.index.lookup() {
            Some(lookup) => lookup.elements(&key),
            None => &[],
        };
        (self.result)(outer, matches)
    }
}

impl<O, I, K, R, Q> StageLogic for GroupJoinLogic<O, I, K, R, Q>
where
    O: AsyncSequence,
    I: AsyncSequence,
    K: Send,
    R: Send,
    Q: KeyEquality<K> + Clone,
{
    type Item = R;
    const NAME: &'static str = "group_join";

    fn open(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.outer.open(cancel);
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<R>>> {
        loop {
            match self.phase {
                JoinPhase::Start => match ready!(self.outer.poll_next(cx))? {
                    Some(first) => {
                        self.pending = Some(first);
                        self.index.start(
                            Arc::clone(&self.inner_key),
                            self.equality.clone(),
                            &self.config,
                            &self.cancel,
                        );
                        self.phase = JoinPhase::Building;
                    }
                    None => self.phase = JoinPhase::Done,
                },
                JoinPhase::Building => {
                    ready!(self.index.poll_build(cx, Self::NAME))?;
                    self.phase = JoinPhase::Probing;
                }
                JoinPhase::Probing => {
                    let outer = match self.pending.take() {
                        Some(first) => first,
                        None => match ready!(self.outer.poll_next(cx))? {
                            Some(outer) => outer,
                            None => {
                                self.phase = JoinPhase::Done;
                                continue;
                            }
                        },
                    };
                    return Poll::Ready(self.emit(outer).map(Some));
                }
                JoinPhase::Done => return Poll::Ready(Ok(None)),
            }
        }
    }

    fn release(&mut self) {
        self.outer.release();
        self.index.release();
        self.pending = None;
    }
}

impl<O, I, K, R, Q> AsyncSequence for GroupJoin<O, I, K, R, Q>
where
    O: AsyncSequence + 'static,
    I: AsyncSequence + 'static,
    K: Send + 'static,
    R: Send + 'static,
    Q: KeyEquality<K> + Clone + 'static,
{
    type Item = R;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<R> {
        let logic = GroupJoinLogic {
            phase: JoinPhase::Start,
            outer: Upstream::new(Arc::clone(&self.outer)),
            index: InnerIndex::new(Upstream::new(Arc::clone(&self.inner))),
            pending: None,
            outer_key: Arc::clone(&self.outer_key),
            inner_key: Arc::clone(&self.inner_key),
            result: Arc::clone(&self.result),
            equality: self.equality.clone(),
            config: self.config.clone(),
            cancel: cancel.clone(),
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        self.outer.len_hint()
    }
}
