//! Ordering collaborators consumed by the ordering engine.

use std::cmp::Ordering;
use std::sync::Arc;

/// `compare(a, b)` capability over a key type.
pub trait KeyOrdering<K: ?Sized>: Send + Sync {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The default total order of a key type.
///
/// Unlike `Ord` this is implemented for floats: NaN sorts before every
/// other value (negative infinity included) and equals itself, which keeps
/// the relation total.
pub trait DefaultOrder {
    fn default_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! default_order_via_ord {
    ($($t:ty),* $(,)?) => {
        $(
            impl DefaultOrder for $t {
                fn default_cmp(&self, other: &Self) -> Ordering {
                    Ord::cmp(self, other)
                }
            }
        )*
    };
}

default_order_via_ord!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, (), String, str,
);

macro_rules! default_order_float {
    ($($t:ty),*) => {
        $(
            impl DefaultOrder for $t {
                fn default_cmp(&self, other: &Self) -> Ordering {
                    match (self.is_nan(), other.is_nan()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        _ => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                    }
                }
            }
        )*
    };
}

default_order_float!(f32, f64);

/// `None` sorts first.
impl<T: DefaultOrder> DefaultOrder for Option<T> {
    fn default_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Some(a), Some(b)) => a.default_cmp(b),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        }
    }
}

impl<T: DefaultOrder + ?Sized> DefaultOrder for &T {
    fn default_cmp(&self, other: &Self) -> Ordering {
        (**self).default_cmp(*other)
    }
}

impl<T: DefaultOrder> DefaultOrder for [T] {
    fn default_cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.iter().zip(other.iter()) {
            match a.default_cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.len().cmp(&other.len())
    }
}

impl<T: DefaultOrder> DefaultOrder for Vec<T> {
    fn default_cmp(&self, other: &Self) -> Ordering {
        self.as_slice().default_cmp(other.as_slice())
    }
}

impl<A: DefaultOrder, B: DefaultOrder> DefaultOrder for (A, B) {
    fn default_cmp(&self, other: &Self) -> Ordering {
        self.0
            .default_cmp(&other.0)
            .then_with(|| self.1.default_cmp(&other.1))
    }
}

impl<A: DefaultOrder, B: DefaultOrder, C: DefaultOrder> DefaultOrder for (A, B, C) {
    fn default_cmp(&self, other: &Self) -> Ordering {
        self.0
            .default_cmp(&other.0)
            .then_with(|| self.1.default_cmp(&other.1))
            .then_with(|| self.2.default_cmp(&other.2))
    }
}

/// Ordering through `DefaultOrder`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultOrdering;

impl<K: DefaultOrder + ?Sized> KeyOrdering<K> for DefaultOrdering {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.default_cmp(b)
    }
}

/// Ordering from a comparison closure.
#[derive(Clone)]
pub struct OrderingFn<F>(pub F);

impl<K: ?Sized, F> KeyOrdering<K> for OrderingFn<F>
where
    F: Fn(&K, &K) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

impl<K: ?Sized, C: KeyOrdering<K> + ?Sized> KeyOrdering<K> for Arc<C> {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (**self).compare(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_sorts_before_negative_infinity() {
        let ord = DefaultOrdering;
        assert_eq!(ord.compare(&f64::NAN, &f64::NEG_INFINITY), Ordering::Less);
        assert_eq!(ord.compare(&f64::NEG_INFINITY, &f64::NAN), Ordering::Greater);
        assert_eq!(ord.compare(&f64::NAN, &f64::NAN), Ordering::Equal);
        assert_eq!(ord.compare(&f32::NAN, &f32::MIN), Ordering::Less);
    }

    #[test]
    fn test_float_sort_is_total() {
        let mut v = vec![3.0, f64::NAN, -1.0, f64::NEG_INFINITY, f64::NAN, 0.5];
        v.sort_by(|a, b| DefaultOrdering.compare(a, b));
        assert!(v[0].is_nan() && v[1].is_nan());
        assert_eq!(&v[2..], &[f64::NEG_INFINITY, -1.0, 0.5, 3.0]);
    }

    #[test]
    fn test_none_sorts_first() {
        let ord = DefaultOrdering;
        assert_eq!(ord.compare(&None, &Some(i32::MIN)), Ordering::Less);
        assert_eq!(ord.compare(&(1, "b"), &(1, "a")), Ordering::Greater);
    }
}
