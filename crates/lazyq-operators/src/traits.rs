//! Callback shapes shared by the operators.
//!
//! Fallible callbacks return `lazyq_core::Result`; the infallible surface
//! (`filter`, `map`, ...) wraps user closures into these. Errors are never
//! caught or retried: the stage releases its upstream and hands the error to
//! the consumer.

use std::sync::Arc;

use lazyq_core::error::Result;

pub type Predicate<T> = Arc<dyn Fn(&T) -> Result<bool> + Send + Sync>;
pub type Selector<T, U> = Arc<dyn Fn(T) -> Result<U> + Send + Sync>;

/// Left-to-right, short-circuiting conjunction of two predicates.
pub(crate) fn and_then<T: 'static>(first: Predicate<T>, second: Predicate<T>) -> Predicate<T> {
    Arc::new(move |item| Ok(first(item)? && second(item)?))
}

/// `second(first(x))`.
pub(crate) fn compose<T: 'static, U: 'static, V: 'static>(
    first: Selector<T, U>,
    second: Selector<U, V>,
) -> Selector<T, V> {
    Arc::new(move |item| second(first(item)?))
}
