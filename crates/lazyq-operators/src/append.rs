//! Append/prepend without nesting.
//!
//! Both ends are persistent singly linked lists; `append`/`prepend` on an
//! `AppendPrepend` adds one link and shares the rest, so repeated calls stay
//! O(1) and clones of earlier states remain valid.

use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::vec;

use lazyq_core::enumerator::{AsyncSequence, BoxEnumerator};
use lazyq_core::error::Result;
use lazyq_core::stage::{Stage, StageLogic};
use lazyq_core::upstream::Upstream;
use tokio_util::sync::CancellationToken;

struct Link<T> {
    item: T,
    next: Option<Arc<Link<T>>>,
}

/// Newest element at the head.
struct LinkList<T> {
    head: Option<Arc<Link<T>>>,
    len: usize,
}

impl<T> Clone for LinkList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<T: Clone> LinkList<T> {
    fn empty() -> Self {
        Self { head: None, len: 0 }
    }

    fn push(&self, item: T) -> Self {
        Self {
            head: Some(Arc::new(Link {
                item,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Newest first.
    fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_ref();
        while let Some(link) = cursor {
            out.push(link.item.clone());
            cursor = link.next.as_ref();
        }
        out
    }
}

pub struct AppendPrepend<S: AsyncSequence> {
    source: Arc<S>,
    prepended: LinkList<S::Item>,
    appended: LinkList<S::Item>,
}

impl<S: AsyncSequence> Clone for AppendPrepend<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            prepended: self.prepended.clone(),
            appended: self.appended.clone(),
        }
    }
}

impl<S> AppendPrepend<S>
where
    S: AsyncSequence + 'static,
    S::Item: Clone + Sync,
{
    pub(crate) fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            prepended: LinkList::empty(),
            appended: LinkList::empty(),
        }
    }

    pub fn append(self, item: S::Item) -> Self {
        Self {
            appended: self.appended.push(item),
            ..self
        }
    }

    pub fn prepend(self, item: S::Item) -> Self {
        Self {
            prepended: self.prepended.push(item),
            ..self
        }
    }

    pub fn appended(&self) -> usize {
        self.appended.len
    }

    pub fn prepended(&self) -> usize {
        self.prepended.len
    }
}

struct AppendPrependLogic<S: AsyncSequence> {
    upstream: Upstream<S>,
    before: vec::IntoIter<S::Item>,
    after: vec::IntoIter<S::Item>,
}

impl<S: AsyncSequence> StageLogic for AppendPrependLogic<S> {
    type Item = S::Item;
    const NAME: &'static str = "append_prepend";

    fn open(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.upstream.open(cancel);
        Ok(())
    }

    fn poll_produce(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<S::Item>>> {
        if let Some(item) = self.before.next() {
            return Poll::Ready(Ok(Some(item)));
        }
        if self.upstream.is_open() {
            if let Some(item) = ready!(self.upstream.poll_next(cx))? {
                return Poll::Ready(Ok(Some(item)));
            }
            self.upstream.release();
        }
        Poll::Ready(Ok(self.after.next()))
    }

    fn release(&mut self) {
        self.upstream.release();
        self.before = Vec::new().into_iter();
        self.after = Vec::new().into_iter();
    }
}

impl<S> AsyncSequence for AppendPrepend<S>
where
    S: AsyncSequence + 'static,
    S::Item: Clone + Sync,
{
    type Item = S::Item;

    fn enumerate(&self, cancel: &CancellationToken) -> BoxEnumerator<S::Item> {
        let mut after = self.appended.to_vec();
        after.reverse();
        let logic = AppendPrependLogic {
            upstream: Upstream::new(Arc::clone(&self.source)),
            before: self.prepended.to_vec().into_iter(),
            after: after.into_iter(),
        };
        Box::new(Stage::new(logic, cancel))
    }

    fn len_hint(&self) -> Option<usize> {
        self.source
            .len_hint()?
            .checked_add(self.prepended.len + self.appended.len)
    }
}
