//! Building a lookup by draining a sequence.
//!
//! `LookupBuilder` is resumable: `poll_fill` can return `Pending` in the
//! middle of the drain and pick up where it stopped, which is what lets the
//! join stages build their index inside their own `poll_produce`.

use std::sync::Arc;
use std::task::{ready, Context, Poll};

use futures::future::poll_fn;
use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncEnumerator, AsyncSequence, SharedSequence};
use lazyq_core::error::{Error, Result};
use lazyq_core::hash::{DefaultEquality, KeyEquality};
use tokio_util::sync::CancellationToken;

use crate::lookup::Lookup;

pub type KeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;
pub type ElementFn<T, E> = Arc<dyn Fn(T) -> E + Send + Sync>;

pub struct LookupBuilder<T, K, E, Q> {
    lookup: Lookup<K, E, Q>,
    key_selector: KeyFn<T, K>,
    element_selector: ElementFn<T, E>,
    skip_null_keys: bool,
}

impl<T, K, E, Q: KeyEquality<K>> LookupBuilder<T, K, E, Q> {
    pub fn new(
        key_selector: KeyFn<T, K>,
        element_selector: ElementFn<T, E>,
        equality: Q,
        cfg: &QueryConfig,
    ) -> Self {
        Self {
            lookup: Lookup::with_config(equality, cfg),
            key_selector,
            element_selector,
            skip_null_keys: false,
        }
    }

    /// Join semantics: elements whose key is null are dropped, so they can
    /// never match an outer element. General lookups keep null keys.
    pub fn for_join(mut self) -> Self {
        self.skip_null_keys = true;
        self
    }

    pub fn add(&mut self, item: T) {
        let key = (self.key_selector)(&item);
        if self.skip_null_keys && self.lookup.equality().is_null(&key) {
            return;
        }
        let element = (self.element_selector)(item);
        self.lookup.push(key, element);
    }

    /// Drain `source` into the index. Resumable across `Pending`.
    pub fn poll_fill<S>(&mut self, cx: &mut Context<'_>, source: &mut S) -> Poll<Result<()>>
    where
        S: AsyncEnumerator<Item = T> + ?Sized,
    {
        loop {
            if !ready!(source.poll_move_next(cx))? {
                return Poll::Ready(Ok(()));
            }
            if let Some(item) = source.take_current() {
                self.add(item);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn finish(self) -> Lookup<K, E, Q> {
        self.lookup
    }
}

/// Drain `source` once into a fresh lookup.
pub async fn build_lookup<S, K, E, Q>(
    source: &S,
    key_selector: KeyFn<S::Item, K>,
    element_selector: ElementFn<S::Item, E>,
    equality: Q,
    cfg: &QueryConfig,
    cancel: &CancellationToken,
) -> Result<Lookup<K, E, Q>>
where
    S: AsyncSequence + ?Sized,
    Q: KeyEquality<K>,
{
    let builder = LookupBuilder::new(key_selector, element_selector, equality, cfg);
    drain(source, builder, cancel).await
}

async fn drain<S, K, E, Q>(
    source: &S,
    mut builder: LookupBuilder<S::Item, K, E, Q>,
    cancel: &CancellationToken,
) -> Result<Lookup<K, E, Q>>
where
    S: AsyncSequence + ?Sized,
    Q: KeyEquality<K>,
{
    let mut handle = source.enumerate(cancel);
    poll_fn(|cx| builder.poll_fill(cx, &mut handle)).await?;
    Ok(builder.finish())
}

/// Runtime-assembled lookup request.
///
/// Missing pieces are reported as `Error::ArgumentNull` by `build`, before
/// the source is touched.
pub struct LookupSpec<T: Send + 'static, K, E, Q = DefaultEquality> {
    source: Option<SharedSequence<T>>,
    key_selector: Option<KeyFn<T, K>>,
    element_selector: ElementFn<T, E>,
    equality: Q,
    config: QueryConfig,
    for_join: bool,
}

impl<T: Send + 'static, K> LookupSpec<T, K, T, DefaultEquality> {
    pub fn new() -> Self {
        Self {
            source: None,
            key_selector: None,
            element_selector: Arc::new(|item: T| item),
            equality: DefaultEquality,
            config: QueryConfig::default(),
            for_join: false,
        }
    }
}

impl<T: Send + 'static, K> Default for LookupSpec<T, K, T, DefaultEquality> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static, K, E, Q> LookupSpec<T, K, E, Q> {
    pub fn source(mut self, source: SharedSequence<T>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn key_selector(mut self, f: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        self.key_selector = Some(Arc::new(f));
        self
    }

    pub fn element_selector<E2>(
        self,
        f: impl Fn(T) -> E2 + Send + Sync + 'static,
    ) -> LookupSpec<T, K, E2, Q> {
        LookupSpec {
            source: self.source,
            key_selector: self.key_selector,
            element_selector: Arc::new(f),
            equality: self.equality,
            config: self.config,
            for_join: self.for_join,
        }
    }

    pub fn equality<Q2: KeyEquality<K>>(self, equality: Q2) -> LookupSpec<T, K, E, Q2> {
        LookupSpec {
            source: self.source,
            key_selector: self.key_selector,
            element_selector: self.element_selector,
            equality,
            config: self.config,
            for_join: self.for_join,
        }
    }

    pub fn config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn for_join(mut self) -> Self {
        self.for_join = true;
        self
    }
}

impl<T: Send + 'static, K, E, Q: KeyEquality<K>> LookupSpec<T, K, E, Q> {
    /// Validate synchronously, then return the drain as a future.
    pub fn build(
        self,
        cancel: &CancellationToken,
    ) -> Result<impl std::future::Future<Output = Result<Lookup<K, E, Q>>>> {
        let source = self.source.ok_or(Error::ArgumentNull("source"))?;
        let key_selector = self.key_selector.ok_or(Error::ArgumentNull("key_selector"))?;
        self.config.validate()?;

        let mut builder =
            LookupBuilder::new(key_selector, self.element_selector, self.equality, &self.config);
        if self.for_join {
            builder = builder.for_join();
        }
        let cancel = cancel.clone();
        Ok(async move { drain(&source, builder, &cancel).await })
    }
}
