//! Key equality collaborators used by the grouping index and dedup sets.
//!
//! Every operator that compares keys takes an explicit `KeyEquality` value;
//! `DefaultEquality` is only substituted at the API boundary.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// `{hash, equals}` capability over a key type.
///
/// Invariant: `equals(a, b)` implies `hash(a) == hash(b)`.
pub trait KeyEquality<K: ?Sized>: Send + Sync {
    fn hash(&self, key: &K) -> u64;

    fn equals(&self, a: &K, b: &K) -> bool;

    /// Whether `key` is the null key. Join-oriented index builds skip null keys.
    fn is_null(&self, _key: &K) -> bool {
        false
    }
}

/// Equality through `Hash + Eq`. Hashing is deterministic across runs
/// (SipHash with fixed keys), so index layouts are reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultEquality;

impl<K: Hash + Eq + ?Sized> KeyEquality<K> for DefaultEquality {
    fn hash(&self, key: &K) -> u64 {
        let mut h = DefaultHasher::new();
        key.hash(&mut h);
        h.finish()
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Equality over `Option<K>` keys where `None` is the null key.
///
/// Two `None` keys compare equal (general lookups group them together), but
/// join builds drop them because `is_null` reports `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalKey<E = DefaultEquality>(pub E);

impl OptionalKey {
    /// `None`-as-null over `DefaultEquality` for the inner key.
    pub fn new() -> Self {
        OptionalKey(DefaultEquality)
    }
}

impl<K, E: KeyEquality<K>> KeyEquality<Option<K>> for OptionalKey<E> {
    fn hash(&self, key: &Option<K>) -> u64 {
        match key {
            Some(k) => self.0.hash(k),
            None => 0,
        }
    }

    fn equals(&self, a: &Option<K>, b: &Option<K>) -> bool {
        match (a, b) {
            (Some(x), Some(y)) => self.0.equals(x, y),
            (None, None) => true,
            _ => false,
        }
    }

    fn is_null(&self, key: &Option<K>) -> bool {
        key.is_none()
    }
}

/// Equality assembled from a pair of closures.
#[derive(Clone)]
pub struct EqualityFn<H, E> {
    hash: H,
    eq: E,
}

impl<H, E> EqualityFn<H, E> {
    pub fn new(hash: H, eq: E) -> Self {
        Self { hash, eq }
    }
}

impl<K: ?Sized, H, E> KeyEquality<K> for EqualityFn<H, E>
where
    H: Fn(&K) -> u64 + Send + Sync,
    E: Fn(&K, &K) -> bool + Send + Sync,
{
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}

/// ASCII case-insensitive string equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreAsciiCase;

impl<S: AsRef<str> + ?Sized> KeyEquality<S> for IgnoreAsciiCase {
    fn hash(&self, key: &S) -> u64 {
        let mut h = DefaultHasher::new();
        for b in key.as_ref().bytes() {
            h.write_u8(b.to_ascii_lowercase());
        }
        h.finish()
    }

    fn equals(&self, a: &S, b: &S) -> bool {
        a.as_ref().eq_ignore_ascii_case(b.as_ref())
    }
}

impl<K: ?Sized, Q: KeyEquality<K> + ?Sized> KeyEquality<K> for Arc<Q> {
    fn hash(&self, key: &K) -> u64 {
        (**self).hash(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }

    fn is_null(&self, key: &K) -> bool {
        (**self).is_null(key)
    }
}

impl<K: ?Sized, Q: KeyEquality<K> + ?Sized> KeyEquality<K> for &Q {
    fn hash(&self, key: &K) -> u64 {
        (**self).hash(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }

    fn is_null(&self, key: &K) -> bool {
        (**self).is_null(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hash_is_stable() {
        let eq = DefaultEquality;
        assert_eq!(eq.hash("abc"), eq.hash("abc"));
        assert!(eq.equals(&3, &3));
        assert!(!KeyEquality::<i32>::is_null(&eq, &0));
    }

    #[test]
    fn test_optional_key_nulls() {
        let eq = OptionalKey(DefaultEquality);
        assert!(eq.is_null(&None::<i32>));
        assert!(!eq.is_null(&Some(1)));
        assert!(eq.equals(&None::<i32>, &None));
        assert!(!eq.equals(&Some(1), &None));
    }

    #[test]
    fn test_ignore_ascii_case_agrees_with_hash() {
        let eq = IgnoreAsciiCase;
        assert!(eq.equals("Key", "kEY"));
        assert_eq!(eq.hash("Key"), eq.hash("kEY"));
    }
}
