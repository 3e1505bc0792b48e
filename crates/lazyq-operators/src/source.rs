//! Leaf sources: memory-resident slices, generated ranges, and adapters over
//! `futures::Stream` factories.

use std::marker::PhantomData;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator};
use lazyq_core::error::Result;
use lazyq_core::stage::{Stage, StageLogic};
use tokio_util::sync::CancellationToken;

/// Memory-resident sequence. Every enumeration yields clones of the items.
pub struct MemorySource<T> {
    items: Arc<[T]>,
}

impl<T> Clone for MemorySource<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

pub fn from_vec<T>(items: Vec<T>) -> MemorySource<T> {
    MemorySource {
        items: items.into(),
    }
}

pub fn from_iter<I: IntoIterator>(items: I) -> MemorySource<I::Item> {
    MemorySource {
        items: items.into_iter().collect(),
    }
}

struct MemoryLogic<T> {
    items: Arc<[T]>,
    pos: usize,
}

impl<T: Clone + Send + Sync> StageLogic for MemoryLogic<T> {
    type Item = T;
    const NAME: &'static str = "memory";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }

    fn poll_produce(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        let item = self.items.get(self.pos).cloned();
        self.pos += 1;
        Poll::Ready(Ok(item))
    }

    fn release(&mut self) {
        self.pos = self.items.len();
    }
}

impl<T: Clone + Send + Sync + 'static> AsyncSequence for MemorySource<T> {
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        let logic = MemoryLogic {
            items: Arc::clone(&self.items),
            pos: 0,
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// `count` consecutive integers starting at `start`.
#[derive(Debug, Clone, Copy)]
pub struct Range {
    start: i64,
    count: usize,
}

pub fn range(start: i64, count: usize) -> Range {
    Range { start, count }
}

struct RangeLogic {
    next: i64,
    remaining: usize,
}

impl StageLogic for RangeLogic {
    type Item = i64;
    const NAME: &'static str = "range";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }

    fn poll_produce(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<i64>>> {
        if self.remaining == 0 {
            return Poll::Ready(Ok(None));
        }
        self.remaining -= 1;
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        Poll::Ready(Ok(Some(value)))
    }

    fn release(&mut self) {
        self.remaining = 0;
    }
}

impl AsyncSequence for Range {
    type Item = i64;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<i64> {
        let logic = RangeLogic {
            next: self.start,
            remaining: self.count,
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.count)
    }
}

/// The same item `count` times.
#[derive(Debug, Clone)]
pub struct Repeat<T> {
    item: T,
    count: usize,
}

pub fn repeat<T: Clone>(item: T, count: usize) -> Repeat<T> {
    Repeat { item, count }
}

struct RepeatLogic<T> {
    item: T,
    remaining: usize,
}

impl<T: Clone + Send> StageLogic for RepeatLogic<T> {
    type Item = T;
    const NAME: &'static str = "repeat";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }

    fn poll_produce(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        if self.remaining == 0 {
            return Poll::Ready(Ok(None));
        }
        self.remaining -= 1;
        Poll::Ready(Ok(Some(self.item.clone())))
    }

    fn release(&mut self) {
        self.remaining = 0;
    }
}

impl<T: Clone + Send + Sync + 'static> AsyncSequence for Repeat<T> {
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        let logic = RepeatLogic {
            item: self.item.clone(),
            remaining: self.count,
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.count)
    }
}

/// A sequence with no elements.
pub struct Empty<T>(PhantomData<fn() -> T>);

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        Empty(PhantomData)
    }
}

pub fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

struct EmptyLogic<T>(PhantomData<fn() -> T>);

impl<T> StageLogic for EmptyLogic<T> {
    type Item = T;
    const NAME: &'static str = "empty";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }

    fn poll_produce(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        Poll::Ready(Ok(None))
    }

    fn release(&mut self) {}
}

impl<T: Send + 'static> AsyncSequence for Empty<T> {
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        Box::new(Stage::new(EmptyLogic(PhantomData), cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(0)
    }
}

type StreamFactory<T> = Arc<dyn Fn() -> BoxStream<'static, Result<T>> + Send + Sync>;

/// Source backed by a `futures::Stream` factory. The factory runs once per
/// enumeration, on the first advance, so each enumeration sees a fresh stream.
pub struct StreamSource<T> {
    factory: StreamFactory<T>,
}

impl<T> Clone for StreamSource<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

pub fn from_stream<T, St, F>(factory: F) -> StreamSource<T>
where
    T: Send + 'static,
    F: Fn() -> St + Send + Sync + 'static,
    St: Stream<Item = T> + Send + 'static,
{
    StreamSource {
        factory: Arc::new(move || factory().map(Ok).boxed()),
    }
}

pub fn try_from_stream<T, St, F>(factory: F) -> StreamSource<T>
where
    T: Send + 'static,
    F: Fn() -> St + Send + Sync + 'static,
    St: Stream<Item = Result<T>> + Send + 'static,
{
    StreamSource {
        factory: Arc::new(move || factory().boxed()),
    }
}

struct StreamLogic<T> {
    factory: StreamFactory<T>,
    stream: Option<BoxStream<'static, Result<T>>>,
}

impl<T: Send> StageLogic for StreamLogic<T> {
    type Item = T;
    const NAME: &'static str = "stream";

    fn open(&mut self, _cancel: &CancellationToken) -> Result<()> {
        self.stream = Some((self.factory)());
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        let Some(stream) = self.stream.as_mut() else {
            return Poll::Ready(Ok(None));
        };
        match stream.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(item))) => Poll::Ready(Ok(Some(item))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Err(e)),
            Poll::Ready(None) => Poll::Ready(Ok(None)),
        }
    }

    fn release(&mut self) {
        self.stream = None;
    }
}

impl<T: Send + 'static> AsyncSequence for StreamSource<T> {
    type Item = T;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<T> {
        let logic = StreamLogic {
            factory: Arc::clone(&self.factory),
            stream: None,
        };
        Box::new(Stage::new(logic, cancel))
    }
}
