//! A single key group inside the index.

use std::slice;

/// All elements sharing one key, in first-seen order.
///
/// The key never changes after creation; elements are only appended, and
/// only while the owning index is being built.
#[derive(Debug, Clone)]
pub struct Grouping<K, E> {
    key: K,
    pub(crate) hash: u64,
    // Next grouping (arena index) in the same bucket.
    pub(crate) hash_next: Option<usize>,
    elements: Vec<E>,
}

impl<K, E> Grouping<K, E> {
    pub(crate) fn new(key: K, hash: u64, hash_next: Option<usize>) -> Self {
        Self {
            key,
            hash,
            hash_next,
            elements: Vec::new(),
        }
    }

    /// Append, reserving `initial_capacity` on the first element and
    /// doubling afterwards.
    pub(crate) fn push(&mut self, element: E, initial_capacity: usize) {
        if self.elements.len() == self.elements.capacity() {
            let grow = if self.elements.capacity() == 0 {
                initial_capacity.max(1)
            } else {
                self.elements.capacity()
            };
            self.elements.reserve_exact(grow);
        }
        self.elements.push(element);
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    pub fn iter(&self) -> slice::Iter<'_, E> {
        self.elements.iter()
    }

    pub fn into_parts(self) -> (K, Vec<E>) {
        (self.key, self.elements)
    }
}

impl<'a, K, E> IntoIterator for &'a Grouping<K, E> {
    type Item = &'a E;
    type IntoIter = slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<K, E> IntoIterator for Grouping<K, E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}
