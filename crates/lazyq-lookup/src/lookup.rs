//! Hash grouping index ("lookup").
//!
//! Layout:
//! - `groupings`: arena of groupings in first-seen key order. Arena order
//!   *is* the insertion order, so enumeration never depends on buckets.
//! - `buckets`: head arena index of each bucket's hash chain; chains are
//!   linked through `Grouping::hash_next`.
//!
//! The bucket array starts at `QueryConfig::lookup_initial_buckets` and is
//! rebuilt at `2 * count + 1` whenever the number of groupings reaches the
//! number of buckets. Resizing only relinks hash chains; the arena (and so
//! the insertion order) is untouched.

use std::hash::Hash;
use std::slice;

use lazyq_core::config::QueryConfig;
use lazyq_core::hash::{DefaultEquality, KeyEquality};
use lazyq_core::trace;

use crate::grouping::Grouping;

pub struct Lookup<K, E, Q = DefaultEquality> {
    equality: Q,
    buckets: Vec<Option<usize>>,
    groupings: Vec<Grouping<K, E>>,
    grouping_capacity: usize,
}

impl<K: Hash + Eq, E> Lookup<K, E, DefaultEquality> {
    pub fn with_default_equality() -> Self {
        Self::new(DefaultEquality)
    }
}

impl<K, E, Q: KeyEquality<K>> Lookup<K, E, Q> {
    pub fn new(equality: Q) -> Self {
        Self::with_config(equality, &QueryConfig::default())
    }

    pub fn with_config(equality: Q, cfg: &QueryConfig) -> Self {
        Self {
            equality,
            buckets: vec![None; cfg.lookup_initial_buckets.max(1)],
            groupings: Vec::new(),
            grouping_capacity: cfg.grouping_initial_capacity.max(1),
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groupings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groupings.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn equality(&self) -> &Q {
        &self.equality
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    fn find(&self, key: &K, hash: u64) -> Option<usize> {
        let mut cursor = self.buckets[self.bucket_of(hash)];
        while let Some(idx) = cursor {
            let g = &self.groupings[idx];
            if g.hash == hash && self.equality.equals(g.key(), key) {
                return Some(idx);
            }
            cursor = g.hash_next;
        }
        None
    }

    pub fn get(&self, key: &K) -> Option<&Grouping<K, E>> {
        let hash = self.equality.hash(key);
        self.find(key, hash).map(|idx| &self.groupings[idx])
    }

    /// Arena position of the grouping for `key`. Positions follow first-seen
    /// key order and stay valid for the lifetime of the lookup.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        let hash = self.equality.hash(key);
        self.find(key, hash)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Elements for `key`; empty when the key is absent.
    pub fn elements(&self, key: &K) -> &[E] {
        self.get(key).map(Grouping::elements).unwrap_or(&[])
    }

    /// Arena index of the grouping for `key`, creating it when absent.
    /// The flag reports whether the grouping was created by this call.
    pub(crate) fn find_or_insert(&mut self, key: K) -> (usize, bool) {
        let hash = self.equality.hash(&key);
        if let Some(idx) = self.find(&key, hash) {
            return (idx, false);
        }
        if self.groupings.len() == self.buckets.len() {
            self.resize();
        }
        let bucket = self.bucket_of(hash);
        let idx = self.groupings.len();
        self.groupings
            .push(Grouping::new(key, hash, self.buckets[bucket]));
        self.buckets[bucket] = Some(idx);
        (idx, true)
    }

    pub fn get_or_create(&mut self, key: K) -> &mut Grouping<K, E> {
        let (idx, _) = self.find_or_insert(key);
        &mut self.groupings[idx]
    }

    /// Append `element` to the grouping for `key`.
    pub fn push(&mut self, key: K, element: E) {
        let (idx, _) = self.find_or_insert(key);
        let capacity = self.grouping_capacity;
        self.groupings[idx].push(element, capacity);
    }

    pub(crate) fn push_at(&mut self, idx: usize, element: E) {
        let capacity = self.grouping_capacity;
        self.groupings[idx].push(element, capacity);
    }

    fn resize(&mut self) {
        let old = self.buckets.len();
        let new_size = self.groupings.len() * 2 + 1;
        self.buckets = vec![None; new_size];
        for idx in 0..self.groupings.len() {
            let bucket = (self.groupings[idx].hash % new_size as u64) as usize;
            self.groupings[idx].hash_next = self.buckets[bucket];
            self.buckets[bucket] = Some(idx);
        }
        trace::index_resized(old, new_size, self.groupings.len());
    }

    /// Groupings in first-seen key order.
    pub fn iter(&self) -> slice::Iter<'_, Grouping<K, E>> {
        self.groupings.iter()
    }

    pub fn groupings(&self) -> &[Grouping<K, E>] {
        &self.groupings
    }

    pub fn into_groupings(self) -> Vec<Grouping<K, E>> {
        self.groupings
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.groupings.iter().map(Grouping::key)
    }
}

impl<'a, K, E, Q> IntoIterator for &'a Lookup<K, E, Q> {
    type Item = &'a Grouping<K, E>;
    type IntoIter = slice::Iter<'a, Grouping<K, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groupings.iter()
    }
}

impl<K, E, Q> IntoIterator for Lookup<K, E, Q> {
    type Item = Grouping<K, E>;
    type IntoIter = std::vec::IntoIter<Grouping<K, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groupings.into_iter()
    }
}

impl<K: std::fmt::Debug, E: std::fmt::Debug, Q> std::fmt::Debug for Lookup<K, E, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.groupings.iter().map(|g| (g.key(), g.elements())))
            .finish()
    }
}
