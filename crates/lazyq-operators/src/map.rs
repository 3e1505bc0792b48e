//! Projection stage. `map` on a `Map` composes the selectors (outer after
//! inner) instead of stacking a second stage.

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator};
use lazyq_core::error::Result;
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::upstream::Upstream;
use tokio_util::sync::CancellationToken;

use crate::traits::{compose, Selector};

pub struct Map<S: AsyncSequence, U> {
    source: Arc<S>,
    selector: Selector<S::Item, U>,
}

impl<S: AsyncSequence, U> Clone for Map<S, U> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            selector: Arc::clone(&self.selector),
        }
    }
}

impl<S: AsyncSequence + 'static, U: Send + 'static> Map<S, U> {
    pub(crate) fn new(source: S, selector: Selector<S::Item, U>) -> Self {
        Self {
            source: Arc::new(source),
            selector,
        }
    }

    pub fn map<V, F>(self, selector: F) -> Map<S, V>
    where
        V: Send + 'static,
        F: Fn(U) -> V + Send + Sync + 'static,
    {
        self.try_map(move |item| Ok(selector(item)))
    }

    pub fn try_map<V, F>(self, selector: F) -> Map<S, V>
    where
        V: Send + 'static,
        F: Fn(U) -> Result<V> + Send + Sync + 'static,
    {
        Map {
            source: self.source,
            selector: compose(self.selector, Arc::new(selector)),
        }
    }
}

struct MapLogic<S: AsyncSequence, U> {
    upstream: Upstream<S>,
    selector: Selector<S::Item, U>,
}

impl<S: AsyncSequence, U: Send> StageLogic for MapLogic<S, U> {
    type Item = U;
    const NAME: &'static str = "map";

    fn open(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.upstream.open(cancel);
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<U>>> {
        match ready!(self.upstream.poll_next(cx))? {
            Some(item) => Poll::Ready((self.selector)(item).map(Some)),
            None => Poll::Ready(Ok(None)),
        }
    }

    fn release(&mut self) {
        self.upstream.release();
    }
}

impl<S: AsyncSequence + 'static, U: Send + 'static> AsyncSequence for Map<S, U> {
    type Item = U;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<U> {
        let logic = MapLogic {
            upstream: Upstream::new(Arc::clone(&self.source)),
            selector: Arc::clone(&self.selector),
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        self.source.len_hint()
    }
}
