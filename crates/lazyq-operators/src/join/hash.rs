//! Inner equi-join.

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

pub type JoinFn<O, I, R> = Arc<dyn Fn(&O, &I) -> Result<R> + Send + Sync>;

/// One result per matching `(outer, inner)` pair, outer order first, then
/// the inner elements of the matching group in their encounter order.
pub struct Join<O: AsyncSequence, I: AsyncSequence, K, R, Q> {
    outer: Arc<O>,
    inner: Arc<I>,
    outer_key: KeyFn<O::Item, K>,
    inner_key: KeyFn<I::Item, K>,
    result: JoinFn<O::Item, I::Item, R>,
    equality: Q,
    config: QueryConfig,
}

impl<O: AsyncSequence, I: AsyncSequence, K, R, Q: Clone> Clone for Join<O, I, K, R, Q> {
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

impl<O: AsyncSequence, I: AsyncSequence, K, R, Q> Join<O, I, K, R, Q> {
    pub(crate) fn new(
        outer: O,
        inner: I,
        outer_key: KeyFn<O::Item, K>,
        inner_key: KeyFn<I::Item, K>,
        result: JoinFn<O::Item, I::Item, R>,
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

struct JoinLogic<O: AsyncSequence, I: AsyncSequence, K, R, Q> {
    phase: JoinPhase,
    outer: Upstream<O>,
    index: InnerIndex<I, K, Q>,
    // First outer element, held while the index is built.
    pending: Option<O::Item>,
    // Outer element being matched and the arena position of its group.
    matching: Option<(O::Item, usize)>,
    next: usize,
    outer_key: KeyFn<O::Item, K>,
    inner_key: KeyFn<I::Item, K>,
    result: JoinFn<O::Item, I::Item, R>,
    equality: Q,
    config: QueryConfig,
    cancel: CancellationToken,
}

impl<O, I, K, R, Q> JoinLogic<O, I, K, R, Q>
where
    O: AsyncSequence,
    I: AsyncSequence,
    Q: KeyEquality<K>,
{
    fn bind(&mut self, outer: O::Item) {
        let key = (self.outer_key)(&outer);
        let group = self.index.lookup().and_then(|lookup| lookup.index_of(&key));
        self.matching = group.map(|g| (outer, g));
        self.next = 0;
    }

    fn next_match(&mut self) -> Result<Option<R>> {
        let (Some(lookup), Some((outer, group))) = (self.index.lookup(), self.matching.as_ref())
        else {
            return Ok(None);
        };
        match lookup.groupings()[*group].elements().get(self.next) {
            Some(inner) => {
                self.next += 1;
                (self.result)(outer, inner).map(Some)
            }
            None => {
                self.matching = None;
                Ok(None)
            }
        }
    }
}

impl<O, I, K, R, Q> StageLogic for JoinLogic<O, I, K, R, Q>
where
    O: AsyncSequence,
    I: AsyncSequence,
    K: Send,
    R: Send,
    Q: KeyEquality<K> + Clone,
{
    type Item = R;
    const NAME: &'static str = "join";

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
                    if let Some(first) = self.pending.take() {
                        self.bind(first);
                    }
                    self.phase = JoinPhase::Probing;
                }
                JoinPhase::Probing => {
                    if let Some(result) = self.next_match()? {
                        return Poll::Ready(Ok(Some(result)));
                    }
                    match ready!(self.outer.poll_next(cx))? {
                        Some(outer) => self.bind(outer),
                        None => self.phase = JoinPhase::Done,
                    }
                }
                JoinPhase::Done => return Poll::Ready(Ok(None)),
            }
        }
    }

    fn release(&mut self) {
        self.outer.release();
        self.index.release();
        self.pending = None;
        self.matching = None;
    }
}

impl<O, I, K, R, Q> AsyncSequence for Join<O, I, K, R, Q>
where
    O: AsyncSequence + 'static,
    I: AsyncSequence + 'static,
    K: Send + 'static,
    R: Send + 'static,
    Q: KeyEquality<K> + Clone + 'static,
{
    type Item = R;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<R> {
        let logic = JoinLogic {
            phase: JoinPhase::Start,
            outer: Upstream::new(Arc::clone(&self.outer)),
            index: InnerIndex::new(Upstream::new(Arc::clone(&self.inner))),
            pending: None,
            matching: None,
            next: 0,
            outer_key: Arc::clone(&self.outer_key),
            inner_key: Arc::clone(&self.inner_key),
            result: Arc::clone(&self.result),
            equality: self.equality.clone(),
            config: self.config.clone(),
            cancel: cancel.clone(),
        };
        Box::new(Stage::new(logic, cancel))
    }
}
