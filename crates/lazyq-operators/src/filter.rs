//! Filter stage and its fusions.
//!
//! `filter` on a `Filter` does not nest a second stage: the predicates are
//! combined into one (left-to-right, short-circuit) and evaluated by a single
//! stage over the original source. `map` on a `Filter` likewise yields one
//! `FilterMap` stage.

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator};
use lazyq_core::error::Result;
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::upstream::Upstream;
use tokio_util::sync::CancellationToken;

use crate::traits::{and_then, compose, Predicate, Selector};

pub struct Filter<S: AsyncSequence> {
    source: Arc<S>,
    predicate: Predicate<S::Item>,
}

impl<S: AsyncSequence> Clone for Filter<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: AsyncSequence + 'static> Filter<S> {
    pub(crate) fn new(source: S, predicate: Predicate<S::Item>) -> Self {
        Self {
            source: Arc::new(source),
            predicate,
        }
    }

    pub fn filter<P>(self, predicate: P) -> Filter<S>
    where
        P: Fn(&S::Item) -> bool + Send + Sync + 'static,
    {
        self.try_filter(move |item| Ok(predicate(item)))
    }

    pub fn try_filter<P>(self, predicate: P) -> Filter<S>
    where
        P: Fn(&S::Item) -> Result<bool> + Send + Sync + 'static,
    {
        Filter {
            source: self.source,
            predicate: and_then(self.predicate, Arc::new(predicate)),
        }
    }

    pub fn map<U, F>(self, selector: F) -> FilterMap<S, U>
    where
        U: Send + 'static,
        F: Fn(S::Item) -> U + Send + Sync + 'static,
    {
        self.try_map(move |item| Ok(selector(item)))
    }

    pub fn try_map<U, F>(self, selector: F) -> FilterMap<S, U>
    where
        U: Send + 'static,
        F: Fn(S::Item) -> Result<U> + Send + Sync + 'static,
    {
        FilterMap {
            source: self.source,
            predicate: self.predicate,
            selector: Arc::new(selector),
        }
    }
}

struct FilterLogic<S: AsyncSequence> {
    upstream: Upstream<S>,
    predicate: Predicate<S::Item>,
}

impl<S: AsyncSequence> StageLogic for FilterLogic<S> {
    type Item = S::Item;
    const NAME: &'static str = "filter";

    fn open(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.upstream.open(cancel);
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<S::Item>>> {
        loop {
            match ready!(self.upstream.poll_next(cx))? {
                Some(item) => {
                    if (self.predicate)(&item)? {
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

impl<S: AsyncSequence + 'static> AsyncSequence for Filter<S> {
    type Item = S::Item;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<S::Item> {
        let logic = FilterLogic {
            upstream: Upstream::new(Arc::clone(&self.source)),
            predicate: Arc::clone(&self.predicate),
        };
        Box::new(Stage::new(logic, cancel))
    }
}

/// Filter followed by a projection, evaluated by one stage.
pub struct FilterMap<S: AsyncSequence, U> {
    source: Arc<S>,
    predicate: Predicate<S::Item>,
    selector: Selector<S::Item, U>,
}

impl<S: AsyncSequence, U> Clone for FilterMap<S, U> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            predicate: Arc::clone(&self.predicate),
            selector: Arc::clone(&self.selector),
        }
    }
}

impl<S: AsyncSequence + 'static, U: Send + 'static> FilterMap<S, U> {
    pub fn map<V, F>(self, selector: F) -> FilterMap<S, V>
    where
        V: Send + 'static,
        F: Fn(U) -> V + Send + Sync + 'static,
    {
        self.try_map(move |item| Ok(selector(item)))
    }

    pub fn try_map<V, F>(self, selector: F) -> FilterMap<S, V>
    where
        V: Send + 'static,
        F: Fn(U) -> Result<V> + Send + Sync + 'static,
    {
        FilterMap {
            source: self.source,
            predicate: self.predicate,
            selector: compose(self.selector, Arc::new(selector)),
        }
    }
}

struct FilterMapLogic<S: AsyncSequence, U> {
    upstream: Upstream<S>,
    predicate: Predicate<S::Item>,
    selector: Selector<S::Item, U>,
}

impl<S: AsyncSequence, U: Send> StageLogic for FilterMapLogic<S, U> {
    type Item = U;
    const NAME: &'static str = "filter_map";

    fn open(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.upstream.open(cancel);
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<U>>> {
        loop {
            match ready!(self.upstream.poll_next(cx))? {
                Some(item) => {
                    if (self.predicate)(&item)? {
                        return Poll::Ready((self.selector)(item).map(Some));
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

impl<S: AsyncSequence + 'static, U: Send + 'static> AsyncSequence for FilterMap<S, U> {
    type Item = U;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<U> {
        let logic = FilterMapLogic {
            upstream: Upstream::new(Arc::clone(&self.source)),
            predicate: Arc::clone(&self.predicate),
            selector: Arc::clone(&self.selector),
        };
        Box::new(Stage::new(logic, cancel))
    }
}
