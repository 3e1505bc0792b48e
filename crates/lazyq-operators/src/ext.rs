//! `SequenceExt`: the consumer-facing operator surface.
//!
//! Every combinator is lazy: it consumes `self` by value, wraps it in a new
//! node and returns without touching the source. Terminal methods borrow the
//! pipeline, so it can be enumerated again afterwards.
//!
//! The `*_with` variants take the key collaborator and a `QueryConfig`
//! explicitly; the plain ones default both here.
//!
//! Fusion is static: `Filter`, `Map`, `FilterMap`, `Concat`, `Union`,
//! `AppendPrepend` and `OrderBy` define inherent methods with the same names
//! that extend the existing node instead of nesting a new one.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncSequence, SharedSequence};
use lazyq_core::error::Result;
use lazyq_core::hash::{DefaultEquality, KeyEquality};
use lazyq_core::ordering::{DefaultOrder, DefaultOrdering, KeyOrdering};
use lazyq_lookup::{Dictionary, ElementFn, KeyFn, Lookup};
use tokio_util::sync::CancellationToken;

use crate::append::AppendPrepend;
use crate::concat::Concat;
use crate::consume::{self, CheckedSum};
use crate::distinct::Distinct;
use crate::filter::Filter;
use crate::group::GroupBy;
use crate::join::{GroupJoin, Join};
use crate::map::Map;
use crate::sort::OrderBy;
use crate::union::Union;

pub trait SequenceExt: AsyncSequence + Sized + 'static {
    fn filter<P>(self, predicate: P) -> Filter<Self>
    where
        P: Fn(&Self::Item) -> bool + Send + Sync + 'static,
    {
        self.try_filter(move |item| Ok(predicate(item)))
    }

    fn try_filter<P>(self, predicate: P) -> Filter<Self>
    where
        P: Fn(&Self::Item) -> Result<bool> + Send + Sync + 'static,
    {
        Filter::new(self, Arc::new(predicate))
    }

    fn map<U, F>(self, selector: F) -> Map<Self, U>
    where
        U: Send + 'static,
        F: Fn(Self::Item) -> U + Send + Sync + 'static,
    {
        self.try_map(move |item| Ok(selector(item)))
    }

    fn try_map<U, F>(self, selector: F) -> Map<Self, U>
    where
        U: Send + 'static,
        F: Fn(Self::Item) -> Result<U> + Send + Sync + 'static,
    {
        Map::new(self, Arc::new(selector))
    }

    fn concat<S>(self, other: S) -> Concat<Self::Item>
    where
        S: AsyncSequence<Item = Self::Item> + 'static,
    {
        self.concat_with_config(other, &QueryConfig::default())
    }

    fn concat_with_config<S>(self, other: S, cfg: &QueryConfig) -> Concat<Self::Item>
    where
        S: AsyncSequence<Item = Self::Item> + 'static,
    {
        Concat::new(Arc::new(self), Arc::new(other), cfg)
    }

    fn union<S>(self, other: S) -> Union<Self::Item, DefaultEquality>
    where
        S: AsyncSequence<Item = Self::Item> + 'static,
        Self::Item: Clone + Sync + Hash + Eq,
    {
        self.union_with(other, DefaultEquality, &QueryConfig::default())
    }

    fn union_with<S, Q>(self, other: S, equality: Q, cfg: &QueryConfig) -> Union<Self::Item, Q>
    where
        S: AsyncSequence<Item = Self::Item> + 'static,
        Self::Item: Clone + Sync,
        Q: KeyEquality<Self::Item> + Clone + 'static,
    {
        Union::new(Arc::new(self), Arc::new(other), equality, cfg)
    }

    fn distinct(self) -> Distinct<Self, DefaultEquality>
    where
        Self::Item: Clone + Hash + Eq,
    {
        self.distinct_with(DefaultEquality, &QueryConfig::default())
    }

    fn distinct_with<Q>(self, equality: Q, cfg: &QueryConfig) -> Distinct<Self, Q>
    where
        Self::Item: Clone,
        Q: KeyEquality<Self::Item> + Clone + 'static,
    {
        Distinct::new(self, equality, cfg)
    }

    fn append(self, item: Self::Item) -> AppendPrepend<Self>
    where
        Self::Item: Clone + Sync,
    {
        AppendPrepend::new(self).append(item)
    }

    fn prepend(self, item: Self::Item) -> AppendPrepend<Self>
    where
        Self::Item: Clone + Sync,
    {
        AppendPrepend::new(self).prepend(item)
    }

    /// Inner equi-join. The inner sequence is indexed on the first advance,
    /// and only if the outer sequence is non-empty.
    fn join<I, K, R, OK, IK, F>(
        self,
        inner: I,
        outer_key: OK,
        inner_key: IK,
        result: F,
    ) -> Join<Self, I, K, R, DefaultEquality>
    where
        I: AsyncSequence + 'static,
        K: Hash + Eq + Send + 'static,
        R: Send + 'static,
        OK: Fn(&Self::Item) -> K + Send + Sync + 'static,
        IK: Fn(&I::Item) -> K + Send + Sync + 'static,
        F: Fn(&Self::Item, &I::Item) -> R + Send + Sync + 'static,
    {
        self.join_with(
            inner,
            outer_key,
            inner_key,
            result,
            DefaultEquality,
            &QueryConfig::default(),
        )
    }

    fn join_with<I, K, R, OK, IK, F, Q>(
        self,
        inner: I,
        outer_key: OK,
        inner_key: IK,
        result: F,
        equality: Q,
        cfg: &QueryConfig,
    ) -> Join<Self, I, K, R, Q>
    where
        I: AsyncSequence + 'static,
        K: Send + 'static,
        R: Send + 'static,
        OK: Fn(&Self::Item) -> K + Send + Sync + 'static,
        IK: Fn(&I::Item) -> K + Send + Sync + 'static,
        F: Fn(&Self::Item, &I::Item) -> R + Send + Sync + 'static,
        Q: KeyEquality<K> + Clone + 'static,
    {
        Join::new(
            self,
            inner,
            Arc::new(outer_key),
            Arc::new(inner_key),
            Arc::new(move |o: &Self::Item, i: &I::Item| Ok(result(o, i))),
            equality,
            cfg,
        )
    }

    /// One result per outer element, paired with its (possibly empty) matches.
    fn group_join<I, K, R, OK, IK, F>(
        self,
        inner: I,
        outer_key: OK,
        inner_key: IK,
        result: F,
    ) -> GroupJoin<Self, I, K, R, DefaultEquality>
    where
        I: AsyncSequence + 'static,
        K: Hash + Eq + Send + 'static,
        R: Send + 'static,
        OK: Fn(&Self::Item) -> K + Send + Sync + 'static,
        IK: Fn(&I::Item) -> K + Send + Sync + 'static,
        F: Fn(Self::Item, &[I::Item]) -> R + Send + Sync + 'static,
    {
        self.group_join_with(
            inner,
            outer_key,
            inner_key,
            result,
            DefaultEquality,
            &QueryConfig::default(),
        )
    }

    fn group_join_with<I, K, R, OK, IK, F, Q>(
        self,
        inner: I,
        outer_key: OK,
        inner_key: IK,
        result: F,
        equality: Q,
        cfg: &QueryConfig,
    ) -> GroupJoin<Self, I, K, R, Q>
    where
        I: AsyncSequence + 'static,
        K: Send + 'static,
        R: Send + 'static,
        OK: Fn(&Self::Item) -> K + Send + Sync + 'static,
        IK: Fn(&I::Item) -> K + Send + Sync + 'static,
        F: Fn(Self::Item, &[I::Item]) -> R + Send + Sync + 'static,
        Q: KeyEquality<K> + Clone + 'static,
    {
        GroupJoin::new(
            self,
            inner,
            Arc::new(outer_key),
            Arc::new(inner_key),
            Arc::new(move |o: Self::Item, matches: &[I::Item]| Ok(result(o, matches))),
            equality,
            cfg,
        )
    }

    fn group_by<K, F>(self, key: F) -> GroupBy<Self, K, Self::Item, DefaultEquality>
    where
        K: Hash + Eq + Send + 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
    {
        self.group_by_with(
            key,
            |item: Self::Item| item,
            DefaultEquality,
            &QueryConfig::default(),
        )
    }

    fn group_by_with<K, E, F, G, Q>(
        self,
        key: F,
        element: G,
        equality: Q,
        cfg: &QueryConfig,
    ) -> GroupBy<Self, K, E, Q>
    where
        K: Send + 'static,
        E: Send + 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
        G: Fn(Self::Item) -> E + Send + Sync + 'static,
        Q: KeyEquality<K> + Clone + 'static,
    {
        GroupBy::new(self, Arc::new(key), Arc::new(element), equality, cfg)
    }

    fn order_by<K, F>(self, key: F) -> OrderBy<Self>
    where
        K: DefaultOrder + 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
    {
        self.order_by_with(key, DefaultOrdering, false, &QueryConfig::default())
    }

    fn order_by_descending<K, F>(self, key: F) -> OrderBy<Self>
    where
        K: DefaultOrder + 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
    {
        self.order_by_with(key, DefaultOrdering, true, &QueryConfig::default())
    }

    fn order_by_with<K, F, C>(
        self,
        key: F,
        comparer: C,
        descending: bool,
        cfg: &QueryConfig,
    ) -> OrderBy<Self>
    where
        K: 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
        C: KeyOrdering<K> + 'static,
    {
        OrderBy::new(self, key, comparer, descending, cfg)
    }

    /// Erase the pipeline type behind a shared pointer.
    fn shared(self) -> SharedSequence<Self::Item> {
        Arc::new(self)
    }

    fn boxed(self) -> Box<dyn AsyncSequence<Item = Self::Item>> {
        Box::new(self)
    }

    fn to_vec<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Vec<Self::Item>>> + Send + 'a {
        consume::to_vec(self, cancel)
    }

    fn to_lookup<'a, K, F>(
        &'a self,
        key: F,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Lookup<K, Self::Item, DefaultEquality>>> + Send + 'a
    where
        K: Hash + Eq + Send + 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
    {
        let key: KeyFn<Self::Item, K> = Arc::new(key);
        let element: ElementFn<Self::Item, Self::Item> = Arc::new(|item: Self::Item| item);
        async move {
            let cfg = QueryConfig::default();
            consume::to_lookup(self, key, element, DefaultEquality, &cfg, cancel).await
        }
    }

    fn to_lookup_with<'a, K, E, F, G, Q>(
        &'a self,
        key: F,
        element: G,
        equality: Q,
        cfg: &'a QueryConfig,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Lookup<K, E, Q>>> + Send + 'a
    where
        K: Send + 'static,
        E: Send + 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
        G: Fn(Self::Item) -> E + Send + Sync + 'static,
        Q: KeyEquality<K> + 'static,
    {
        let key: KeyFn<Self::Item, K> = Arc::new(key);
        let element: ElementFn<Self::Item, E> = Arc::new(element);
        consume::to_lookup(self, key, element, equality, cfg, cancel)
    }

    /// Fails with `DuplicateKey` when two elements share a key.
    fn to_dictionary<'a, K, V, F, G>(
        &'a self,
        key: F,
        value: G,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Dictionary<K, V, DefaultEquality>>> + Send + 'a
    where
        K: Hash + Eq + Send + 'static,
        V: Send + 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
        G: Fn(Self::Item) -> V + Send + Sync + 'static,
    {
        let key: KeyFn<Self::Item, K> = Arc::new(key);
        let value: ElementFn<Self::Item, V> = Arc::new(value);
        async move {
            let cfg = QueryConfig::default();
            consume::to_dictionary(self, key, value, DefaultEquality, &cfg, cancel).await
        }
    }

    fn to_dictionary_with<'a, K, V, F, G, Q>(
        &'a self,
        key: F,
        value: G,
        equality: Q,
        cfg: &'a QueryConfig,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Dictionary<K, V, Q>>> + Send + 'a
    where
        K: Send + 'static,
        V: Send + 'static,
        F: Fn(&Self::Item) -> K + Send + Sync + 'static,
        G: Fn(Self::Item) -> V + Send + Sync + 'static,
        Q: KeyEquality<K> + 'static,
    {
        let key: KeyFn<Self::Item, K> = Arc::new(key);
        let value: ElementFn<Self::Item, V> = Arc::new(value);
        consume::to_dictionary(self, key, value, equality, cfg, cancel)
    }

    fn count<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<usize>> + Send + 'a {
        consume::count(self, cancel)
    }

    fn sum<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Self::Item>> + Send + 'a
    where
        Self::Item: CheckedSum,
    {
        consume::sum(self, cancel)
    }

    fn first<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Self::Item>> + Send + 'a {
        consume::first(self, cancel)
    }

    fn first_or_default<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Self::Item>> + Send + 'a
    where
        Self::Item: Default,
    {
        consume::first_or_default(self, cancel)
    }

    fn last<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Self::Item>> + Send + 'a {
        consume::last(self, cancel)
    }

    fn last_or_default<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Self::Item>> + Send + 'a
    where
        Self::Item: Default,
    {
        consume::last_or_default(self, cancel)
    }

    fn single<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Self::Item>> + Send + 'a {
        consume::single(self, cancel)
    }

    fn single_or_default<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Self::Item>> + Send + 'a
    where
        Self::Item: Default,
    {
        consume::single_or_default(self, cancel)
    }

    fn any<'a, P>(
        &'a self,
        predicate: P,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<bool>> + Send + 'a
    where
        P: Fn(&Self::Item) -> bool + Send + 'a,
    {
        consume::any(self, predicate, cancel)
    }

    fn all<'a, P>(
        &'a self,
        predicate: P,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<bool>> + Send + 'a
    where
        P: Fn(&Self::Item) -> bool + Send + 'a,
    {
        consume::all(self, predicate, cancel)
    }

    fn fold<'a, A, F>(
        &'a self,
        seed: A,
        f: F,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<A>> + Send + 'a
    where
        A: Send + 'a,
        F: Fn(A, Self::Item) -> A + Send + 'a,
    {
        consume::fold(self, seed, f, cancel)
    }

    /// Seedless fold; `NoElements` on an empty source.
    fn reduce<'a, F>(
        &'a self,
        f: F,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Self::Item>> + Send + 'a
    where
        F: Fn(Self::Item, Self::Item) -> Self::Item + Send + 'a,
    {
        consume::reduce(self, f, cancel)
    }

    fn for_each<'a, F>(
        &'a self,
        f: F,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send + 'a
    where
        F: FnMut(Self::Item) + Send + 'a,
    {
        consume::for_each(self, f, cancel)
    }
}

impl<S: AsyncSequence + Sized + 'static> SequenceExt for S {}
