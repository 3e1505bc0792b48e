//! Instrumented sources shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::executor::block_on;
use lazyq::prelude::*;

/// Open/release/produce counters observed from outside a pipeline.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    produced: Arc<AtomicUsize>,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn produced(&self) -> usize {
        self.produced.load(Ordering::SeqCst)
    }
}

/// Memory source that records every open, release and produced element.
pub struct CountingSource<T> {
    items: Arc<[T]>,
    counters: Counters,
}

pub fn counting<T>(items: Vec<T>) -> (CountingSource<T>, Counters) {
    let counters = Counters::default();
    let source = CountingSource {
        items: items.into(),
        counters: counters.clone(),
    };
    (source, counters)
}

struct CountingLogic<T> {
    items: Arc<[T]>,
    pos: usize,
    counters: Counters,
}

impl<T: Clone + Send + Sync> StageLogic for CountingLogic<T> {
    type Item = T;
    const NAME: &'static str = "counting";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn poll_produce(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        let item = self.items.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
            self.counters.produced.fetch_add(1, Ordering::SeqCst);
        }
        Poll::Ready(Ok(item))
    }

    fn release(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: Clone + Send + Sync + 'static> AsyncSequence for CountingSource<T> {
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        let logic = CountingLogic {
            items: Arc::clone(&self.items),
            pos: 0,
            counters: self.counters.clone(),
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Suspends (wakes itself and returns `Pending`) before every element.
pub struct PendingSource<T> {
    items: Arc<[T]>,
}

pub fn pending<T>(items: Vec<T>) -> PendingSource<T> {
    PendingSource {
        items: items.into(),
    }
}

struct PendingLogic<T> {
    items: Arc<[T]>,
    pos: usize,
    primed: bool,
}

impl<T: Clone + Send + Sync> StageLogic for PendingLogic<T> {
    type Item = T;
    const NAME: &'static str = "pending";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        if !self.primed {
            self.primed = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        self.primed = false;
        let item = self.items.get(self.pos).cloned();
        self.pos += 1;
        Poll::Ready(Ok(item))
    }

    fn release(&mut self) {}
}

impl<T: Clone + Send + Sync + 'static> AsyncSequence for PendingSource<T> {
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        let logic = PendingLogic {
            items: Arc::clone(&self.items),
            pos: 0,
            primed: false,
        };
        Box::new(Stage::new(logic, cancel))
    }
}

/// Yields `items[..fail_at]`, then fails.
pub struct FailingSource<T> {
    items: Arc<[T]>,
    fail_at: usize,
    counters: Counters,
}

pub fn failing<T>(items: Vec<T>, fail_at: usize) -> (FailingSource<T>, Counters) {
    let counters = Counters::default();
    let source = FailingSource {
        items: items.into(),
        fail_at,
        counters: counters.clone(),
    };
    (source, counters)
}

struct FailingLogic<T> {
    items: Arc<[T]>,
    pos: usize,
    fail_at: usize,
    counters: Counters,
}

impl<T: Clone + Send + Sync> StageLogic for FailingLogic<T> {
    type Item = T;
    const NAME: &'static str = "failing";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn poll_produce(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        if self.pos == self.fail_at {
            return Poll::Ready(Err(Error::callback("source failed")));
        }
        let item = self.items.get(self.pos).cloned();
        self.pos += 1;
        Poll::Ready(Ok(item))
    }

    fn release(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: Clone + Send + Sync + 'static> AsyncSequence for FailingSource<T> {
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        let logic = FailingLogic {
            items: Arc::clone(&self.items),
            pos: 0,
            fail_at: self.fail_at,
            counters: self.counters.clone(),
        };
        Box::new(Stage::new(logic, cancel))
    }
}

/// Drain a pipeline on the current thread.
pub fn collect<S: AsyncSequence + ?Sized>(source: &S) -> Result<Vec<S::Item>> {
    let cancel = CancellationToken::new();
    block_on(lazyq_operators::consume::to_vec(source, &cancel))
}
