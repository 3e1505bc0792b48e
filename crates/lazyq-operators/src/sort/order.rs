use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::vec;

use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator};
use lazyq_core::error::Result;
use lazyq_core::ordering::{DefaultOrder, DefaultOrdering, KeyOrdering};
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::upstream::Upstream;
use lazyq_lookup::KeyFn;
use tokio_util::sync::CancellationToken;

use super::keys::{sorted_positions, KeyLevel, SortLevel};

/// A stably ordered view of a source. `then_by*` adds a level to this node
/// rather than sorting twice.
pub struct OrderBy<S: AsyncSequence> {
    source: Arc<S>,
    levels: Vec<Arc<dyn SortLevel<S::Item>>>,
    config: QueryConfig,
}

impl<S: AsyncSequence> Clone for OrderBy<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            levels: self.levels.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: AsyncSequence + 'static> OrderBy<S> {
    pub(crate) fn new<K, F, C>(
        source: S,
        key: F,
        comparer: C,
        descending: bool,
        cfg: &QueryConfig,
    ) -> Self
    where
        K: 'static,
        F: Fn(&S::Item) -> K + Send + Sync + 'static,
        C: KeyOrdering<K> + 'static,
    {
        let key: KeyFn<S::Item, K> = Arc::new(key);
        let level: Arc<dyn SortLevel<S::Item>> =
            Arc::new(KeyLevel::new(key, comparer, descending));
        Self {
            source: Arc::new(source),
            levels: vec![level],
            config: cfg.clone(),
        }
    }

    /// Number of sort levels.
    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    pub fn then_by<K, F>(self, key: F) -> Self
    where
        K: DefaultOrder + 'static,
        F: Fn(&S::Item) -> K + Send + Sync + 'static,
    {
        self.then_by_with(key, DefaultOrdering, false)
    }

    pub fn then_by_descending<K, F>(self, key: F) -> Self
    where
        K: DefaultOrder + 'static,
        F: Fn(&S::Item) -> K + Send + Sync + 'static,
    {
        self.then_by_with(key, DefaultOrdering, true)
    }

    pub fn then_by_with<K, F, C>(mut self, key: F, comparer: C, descending: bool) -> Self
    where
        K: 'static,
        F: Fn(&S::Item) -> K + Send + Sync + 'static,
        C: KeyOrdering<K> + 'static,
    {
        let key: KeyFn<S::Item, K> = Arc::new(key);
        self.levels
            .push(Arc::new(KeyLevel::new(key, comparer, descending)));
        self
    }
}

enum SortPhase<T> {
    Buffering(Vec<T>),
    Emitting {
        items: Vec<Option<T>>,
        order: vec::IntoIter<usize>,
    },
    Done,
}

struct OrderByLogic<S: AsyncSequence> {
    upstream: Upstream<S>,
    levels: Vec<Arc<dyn SortLevel<S::Item>>>,
    phase: SortPhase<S::Item>,
}

impl<S: AsyncSequence> StageLogic for OrderByLogic<S> {
    type Item = S::Item;
    const NAME: &'static str = "order_by";

    fn open(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.upstream.open(cancel);
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<S::Item>>> {
        loop {
            match &mut self.phase {
                SortPhase::Buffering(buffer) => {
                    while let Some(item) = ready!(self.upstream.poll_next(cx))? {
                        buffer.push(item);
                    }
                    self.upstream.release();
                    let items = std::mem::take(buffer);
                    let order = sorted_positions(&items, &self.levels);
                    self.phase = SortPhase::Emitting {
                        items: items.into_iter().map(Some).collect(),
                        order: order.into_iter(),
                    };
                }
                SortPhase::Emitting { items, order } => {
                    let next = order.next().and_then(|pos| items[pos].take());
                    return Poll::Ready(Ok(next));
                }
                SortPhase::Done => return Poll::Ready(Ok(None)),
            }
        }
    }

    fn release(&mut self) {
        self.upstream.release();
        self.phase = SortPhase::Done;
    }
}

impl<S: AsyncSequence + 'static> AsyncSequence for OrderBy<S> {
    type Item = S::Item;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<S::Item> {
        let capacity = self
            .source
            .len_hint()
            .unwrap_or(self.config.sort_buffer_capacity_hint);
        let logic = OrderByLogic {
            upstream: Upstream::new(Arc::clone(&self.source)),
            levels: self.levels.clone(),
            phase: SortPhase::Buffering(Vec::with_capacity(capacity)),
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        self.source.len_hint()
    }
}
