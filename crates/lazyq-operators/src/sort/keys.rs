//! Sort levels and their per-enumeration key columns.

use std::cmp::Ordering;
use std::sync::Arc;

use lazyq_core::ordering::KeyOrdering;
use lazyq_lookup::KeyFn;

/// One `order_by` / `then_by` level, type-erased over its key type.
pub(crate) trait SortLevel<T>: Send + Sync {
    /// Evaluate the key selector once for every buffered element.
    fn keys(&self, items: &[T]) -> Box<dyn LevelKeys>;
}

/// Keys of one level, addressed by buffer position.
pub(crate) trait LevelKeys {
    fn compare(&self, a: usize, b: usize) -> Ordering;
}

pub(crate) struct KeyLevel<T, K, C> {
    key: KeyFn<T, K>,
    comparer: Arc<C>,
    descending: bool,
}

impl<T, K, C> KeyLevel<T, K, C> {
    pub(crate) fn new(key: KeyFn<T, K>, comparer: C, descending: bool) -> Self {
        Self {
            key,
            comparer: Arc::new(comparer),
            descending,
        }
    }
}

struct KeyColumn<K, C> {
    keys: Vec<K>,
    comparer: Arc<C>,
    descending: bool,
}

impl<K, C: KeyOrdering<K>> LevelKeys for KeyColumn<K, C> {
    fn compare(&self, a: usize, b: usize) -> Ordering {
        let ord = self.comparer.compare(&self.keys[a], &self.keys[b]);
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

impl<T, K, C> SortLevel<T> for KeyLevel<T, K, C>
where
    K: 'static,
    C: KeyOrdering<K> + 'static,
{
    fn keys(&self, items: &[T]) -> Box<dyn LevelKeys> {
        Box::new(KeyColumn {
            keys: items.iter().map(|item| (self.key)(item)).collect(),
            comparer: Arc::clone(&self.comparer),
            descending: self.descending,
        })
    }
}

/// Positions `0..items.len()` sorted by the levels, ties kept in buffer order.
pub(crate) fn sorted_positions<T>(items: &[T], levels: &[Arc<dyn SortLevel<T>>]) -> Vec<usize> {
    let columns: Vec<Box<dyn LevelKeys>> = levels.iter().map(|level| level.keys(items)).collect();
    let mut positions: Vec<usize> = (0..items.len()).collect();
    positions.sort_by(|&a, &b| {
        columns
            .iter()
            .map(|column| column.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    positions
}
