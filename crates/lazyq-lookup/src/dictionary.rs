//! Unique-key dictionary built on the grouping index.

use std::collections::HashMap;
use std::hash::Hash;

use lazyq_core::config::QueryConfig;
use lazyq_core::error::{Error, Result};
use lazyq_core::hash::{DefaultEquality, KeyEquality};

use crate::lookup::Lookup;

/// Like a lookup, but every key holds exactly one value and a second value
/// for an equal key is rejected with `Error::DuplicateKey`.
pub struct Dictionary<K, V, Q = DefaultEquality> {
    index: Lookup<K, V, Q>,
}

impl<K, V, Q: KeyEquality<K>> Dictionary<K, V, Q> {
    pub fn new(equality: Q) -> Self {
        Self::with_config(equality, &QueryConfig::default())
    }

    pub fn with_config(equality: Q, cfg: &QueryConfig) -> Self {
        Self {
            index: Lookup::with_config(equality, cfg),
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let (idx, created) = self.index.find_or_insert(key);
        if !created {
            return Err(Error::DuplicateKey);
        }
        self.index.push_at(idx, value);
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).and_then(|g| g.elements().first())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.index
            .iter()
            .filter_map(|g| g.elements().first().map(|v| (g.key(), v)))
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.index
            .into_iter()
            .filter_map(|g| {
                let (k, mut values) = g.into_parts();
                values.pop().map(|v| (k, v))
            })
            .collect()
    }
}

impl<K: Hash + Eq, V, Q: KeyEquality<K>> Dictionary<K, V, Q> {
    pub fn into_hash_map(self) -> HashMap<K, V> {
        self.into_entries().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_rejected() {
        let mut dict = Dictionary::new(DefaultEquality);
        dict.insert("a", 1).unwrap();
        dict.insert("b", 2).unwrap();
        assert_eq!(dict.insert("a", 3), Err(Error::DuplicateKey));
        assert_eq!(dict.get(&"a"), Some(&1));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut dict = Dictionary::new(DefaultEquality);
        for (k, v) in [(3, "c"), (1, "a"), (2, "b")] {
            dict.insert(k, v).unwrap();
        }
        let keys: Vec<_> = dict.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![3, 1, 2]);
        assert_eq!(dict.into_hash_map().get(&1), Some(&"a"));
    }
}
