//! Dedup set shared by `union` and `distinct`.

use lazyq_core::config::QueryConfig;
use lazyq_core::hash::{DefaultEquality, KeyEquality};

use crate::lookup::Lookup;

/// Insertion-ordered set over the same open-hash layout as [`Lookup`].
pub struct KeySet<T, Q = DefaultEquality> {
    index: Lookup<T, (), Q>,
}

impl<T, Q: KeyEquality<T>> KeySet<T, Q> {
    pub fn new(equality: Q) -> Self {
        Self::with_config(equality, &QueryConfig::default())
    }

    pub fn with_config(equality: Q, cfg: &QueryConfig) -> Self {
        Self {
            index: Lookup::with_config(equality, cfg),
        }
    }

    /// Returns `true` when `value` was not present yet.
    pub fn insert(&mut self, value: T) -> bool {
        self.index.find_or_insert(value).1
    }

    pub fn contains(&self, value: &T) -> bool {
        self.index.contains_key(value)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Values in first-inserted order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.index.keys()
    }
}
