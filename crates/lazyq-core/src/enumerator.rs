//! The suspension handle (`AsyncEnumerator`) and source (`AsyncSequence`) protocol.
//!
//! A pipeline is a chain of sequences. Nothing executes until a consumer calls
//! `enumerate` and starts advancing the returned handle. Every handle is
//! exclusively owned by whoever created it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::stage::StageState;

/// "try advance" + "current".
///
/// Invariants:
/// - `current` is `Some` only between a successful advance and the next
///   advance call; it must not be relied on after `poll_move_next` yields
///   `Ok(false)` or an error.
/// - `dispose` is idempotent. Advancing a disposed handle yields `Ok(false)`.
pub trait AsyncEnumerator: Send {
    type Item;

    /// Try to advance. `Pending` means the handle is suspended and the
    /// context's waker fires when it can make progress.
    fn poll_move_next(&mut self, cx: &mut Context<'_>) -> Poll<Result<bool>>;

    /// The element produced by the last successful advance.
    fn current(&self) -> Option<&Self::Item>;

    /// Move the current element out. Downstream stages use this to take
    /// ownership without cloning.
    fn take_current(&mut self) -> Option<Self::Item>;

    /// Release every upstream handle and mark the handle disposed.
    fn dispose(&mut self);

    fn state(&self) -> StageState;
}

pub type BoxEnumerator<T> = Box<dyn AsyncEnumerator<Item = T>>;

impl<E: AsyncEnumerator + ?Sized> AsyncEnumerator for Box<E> {
    type Item = E::Item;

    fn poll_move_next(&mut self, cx: &mut Context<'_>) -> Poll<Result<bool>> {
        (**self).poll_move_next(cx)
    }

    fn current(&self) -> Option<&Self::Item> {
        (**self).current()
    }

    fn take_current(&mut self) -> Option<Self::Item> {
        (**self).take_current()
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }

    fn state(&self) -> StageState {
        (**self).state()
    }
}

/// Anything that can hand out fresh, independent enumerators.
///
/// Enumerating the same sequence twice yields two handles with identical
/// configuration and no shared mutable state.
pub trait AsyncSequence: Send + Sync {
    type Item: Send + 'static;

    /// Create an `Unstarted` handle bound to `cancel`. Upstream handles are
    /// opened lazily on the first advance.
    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<Self::Item>;

    /// Exact number of elements when it is cheap to know without enumerating.
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// Type-erased, shareable sequence.
pub type SharedSequence<T> = Arc<dyn AsyncSequence<Item = T>>;

impl<S: AsyncSequence + ?Sized> AsyncSequence for Arc<S> {
    type Item = S::Item;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<Self::Item> {
        (**self).enumerate(cancel)
    }

    fn len_hint(&self) -> Option<usize> {
        (**self).len_hint()
    }
}

impl<S: AsyncSequence + ?Sized> AsyncSequence for Box<S> {
    type Item = S::Item;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<Self::Item> {
        (**self).enumerate(cancel)
    }

    fn len_hint(&self) -> Option<usize> {
        (**self).len_hint()
    }
}

/// Future returned by [`AsyncEnumeratorExt::move_next`].
#[must_use = "futures do nothing unless polled"]
pub struct MoveNext<'a, E: ?Sized> {
    handle: &'a mut E,
}

impl<E: AsyncEnumerator + ?Sized> Future for MoveNext<'_, E> {
    type Output = Result<bool>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().handle.poll_move_next(cx)
    }
}

/// Future returned by [`AsyncEnumeratorExt::next_item`].
#[must_use = "futures do nothing unless polled"]
pub struct NextItem<'a, E: ?Sized> {
    handle: &'a mut E,
}

impl<E: AsyncEnumerator + ?Sized> Future for NextItem<'_, E> {
    type Output = Result<Option<E::Item>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let handle = &mut *self.get_mut().handle;
        match handle.poll_move_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(true)) => Poll::Ready(Ok(handle.take_current())),
            Poll::Ready(Ok(false)) => Poll::Ready(Ok(None)),
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
        }
    }
}

/// Async sugar over the poll protocol.
pub trait AsyncEnumeratorExt: AsyncEnumerator {
    fn move_next(&mut self) -> MoveNext<'_, Self> {
        MoveNext { handle: self }
    }

    /// Advance and take the new element in one step.
    fn next_item(&mut self) -> NextItem<'_, Self> {
        NextItem { handle: self }
    }

    fn into_stream(self) -> EnumeratorStream<Self>
    where
        Self: Sized,
    {
        EnumeratorStream { handle: self }
    }
}

impl<E: AsyncEnumerator + ?Sized> AsyncEnumeratorExt for E {}

/// A `futures::Stream` view of an enumerator. Yields `Err` once and then ends.
pub struct EnumeratorStream<E> {
    handle: E,
}

impl<E> EnumeratorStream<E> {
    pub fn into_inner(self) -> E {
        self.handle
    }
}

impl<E: AsyncEnumerator + Unpin> Stream for EnumeratorStream<E> {
    type Item = Result<E::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let handle = &mut self.get_mut().handle;
        match handle.poll_move_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(true)) => Poll::Ready(handle.take_current().map(Ok)),
            Poll::Ready(Ok(false)) => Poll::Ready(None),
            Poll::Ready(Err(e)) => Poll::Ready(Some(Err(e))),
        }
    }
}
