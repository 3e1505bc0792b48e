//! Persistent chain of sources shared by concat and union.
//!
//! Each node points at its predecessor, so extending a chain allocates one
//! node and leaves the earlier chain untouched (it may still be enumerated
//! or extended differently by another owner). Resolving the sources walks
//! the parent links once per enumeration, never per element.

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use lazyq_core::enumerator::{BoxEnumerator, SharedSequence};
use lazyq_core::error::Result;
use tokio_util::sync::CancellationToken;

struct ChainNode<T> {
    prev: Option<Arc<ChainNode<T>>>,
    source: SharedSequence<T>,
    len: usize,
}

pub(crate) struct SourceChain<T> {
    tail: Arc<ChainNode<T>>,
}

impl<T> Clone for SourceChain<T> {
    fn clone(&self) -> Self {
        Self {
            tail: Arc::clone(&self.tail),
        }
    }
}

impl<T: Send + 'static> SourceChain<T> {
    pub(crate) fn pair(first: SharedSequence<T>, second: SharedSequence<T>) -> Self {
        let head = Arc::new(ChainNode {
            prev: None,
            source: first,
            len: 1,
        });
        Self {
            tail: Arc::new(ChainNode {
                prev: Some(head),
                source: second,
                len: 2,
            }),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tail.len
    }

    /// One new node holding `next`, or `None` once the chain has reached
    /// `max_len` sources.
    pub(crate) fn push(&self, next: SharedSequence<T>, max_len: usize) -> Option<Self> {
        if self.tail.len >= max_len {
            return None;
        }
        Some(Self {
            tail: Arc::new(ChainNode {
                prev: Some(Arc::clone(&self.tail)),
                source: next,
                len: self.tail.len + 1,
            }),
        })
    }

    /// Sources in chain order.
    pub(crate) fn sources(&self) -> Vec<SharedSequence<T>> {
        let mut out = Vec::with_capacity(self.tail.len);
        let mut cursor = Some(&self.tail);
        while let Some(node) = cursor {
            out.push(Arc::clone(&node.source));
            cursor = node.prev.as_ref();
        }
        out.reverse();
        out
    }

    /// Sum of the sources' exact lengths, if every one is known.
    pub(crate) fn len_hint(&self) -> Option<usize> {
        let mut total = 0usize;
        let mut cursor = Some(&self.tail);
        while let Some(node) = cursor {
            total = total.checked_add(node.source.len_hint()?)?;
            cursor = node.prev.as_ref();
        }
        Some(total)
    }
}

/// Enumerates the sources of a chain one after another, holding at most one
/// open handle at a time.
pub(crate) struct ChainCursor<T> {
    sources: Vec<SharedSequence<T>>,
    position: usize,
    active: Option<BoxEnumerator<T>>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> ChainCursor<T> {
    pub(crate) fn new(chain: &SourceChain<T>, cancel: &CancellationToken) -> Self {
        Self {
            sources: chain.sources(),
            position: 0,
            active: None,
            cancel: cancel.clone(),
        }
    }

    pub(crate) fn poll_next(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        loop {
            if self.active.is_none() {
                let Some(source) = self.sources.get(self.position) else {
                    return Poll::Ready(Ok(None));
                };
                self.position += 1;
                self.active = Some(source.enumerate(&self.cancel));
            }
            if let Some(handle) = self.active.as_mut() {
                if ready!(handle.poll_move_next(cx))? {
                    return Poll::Ready(Ok(handle.take_current()));
                }
            }
            self.release();
        }
    }

    pub(crate) fn release(&mut self) {
        if let Some(mut handle) = self.active.take() {
            handle.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::from_vec;

    fn shared(items: Vec<i32>) -> SharedSequence<i32> {
        Arc::new(from_vec(items))
    }

    #[test]
    fn test_push_leaves_prefix_untouched() {
        let base = SourceChain::pair(shared(vec![1]), shared(vec![2]));
        let longer = base.push(shared(vec![3]), 16).unwrap();
        assert_eq!(base.len(), 2);
        assert_eq!(longer.len(), 3);
        assert_eq!(longer.len_hint(), Some(3));
    }

    #[test]
    fn test_push_stops_at_ceiling() {
        let base = SourceChain::pair(shared(vec![1]), shared(vec![2]));
        assert!(base.push(shared(vec![3]), 2).is_none());
    }
}
