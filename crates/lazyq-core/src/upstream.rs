//! The "zero or one owned upstream handle" every unary stage carries.

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use tokio_util::sync::CancellationToken;

use crate::enumerator::{AsyncSequence, BoxEnumerator};
use crate::error::Result;

pub struct Upstream<S: AsyncSequence + ?Sized> {
    source: Arc<S>,
    handle: Option<BoxEnumerator<S::Item>>,
}

impl<S: AsyncSequence + ?Sized> Upstream<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            handle: None,
        }
    }

    pub fn open(&mut self, cancel: &CancellationToken) {
        if self.handle.is_none() {
            self.handle = Some(self.source.enumerate(cancel));
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle_mut(&mut self) -> Option<&mut BoxEnumerator<S::Item>> {
        self.handle.as_mut()
    }

    /// Pull one element, taking ownership of it. `Ok(None)` once exhausted
    /// or when the handle was never opened or already released.
    pub fn poll_next(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<S::Item>>> {
        let Some(handle) = self.handle.as_mut() else {
            return Poll::Ready(Ok(None));
        };
        if ready!(handle.poll_move_next(cx))? {
            Poll::Ready(Ok(handle.take_current()))
        } else {
            Poll::Ready(Ok(None))
        }
    }

    /// Dispose the handle. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.dispose();
        }
    }
}
