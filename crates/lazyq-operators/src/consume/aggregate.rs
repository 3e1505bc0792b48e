use lazyq_core::enumerator::{AsyncEnumerator, AsyncEnumeratorExt, AsyncSequence};
use lazyq_core::error::{Error, Result};
use tokio_util::sync::CancellationToken;

/// Addition that reports overflow instead of wrapping.
pub trait CheckedSum: Sized {
    fn zero() -> Self;
    fn checked_sum(self, other: Self) -> Option<Self>;
}

macro_rules! checked_sum_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl CheckedSum for $t {
                fn zero() -> Self {
                    0
                }

                fn checked_sum(self, other: Self) -> Option<Self> {
                    self.checked_add(other)
                }
            }
        )*
    };
}

checked_sum_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! checked_sum_float {
    ($($t:ty),* $(,)?) => {
        $(
            // Floats saturate to infinity; that is not an overflow.
            impl CheckedSum for $t {
                fn zero() -> Self {
                    0.0
                }

                fn checked_sum(self, other: Self) -> Option<Self> {
                    Some(self + other)
                }
            }
        )*
    };
}

checked_sum_float!(f32, f64);

pub async fn count<S>(source: &S, cancel: &CancellationToken) -> Result<usize>
where
    S: AsyncSequence + ?Sized,
{
    let mut handle = source.enumerate(cancel);
    let mut n: usize = 0;
    while handle.move_next().await? {
        n = n.checked_add(1).ok_or(Error::Overflow)?;
    }
    Ok(n)
}

/// Sum of all elements; `Overflow` when the accumulator leaves the type's
/// range. An empty source sums to zero.
pub async fn sum<S>(source: &S, cancel: &CancellationToken) -> Result<S::Item>
where
    S: AsyncSequence + ?Sized,
    S::Item: CheckedSum,
{
    let mut handle = source.enumerate(cancel);
    let mut total = S::Item::zero();
    while let Some(item) = handle.next_item().await? {
        match total.checked_sum(item) {
            Some(next) => total = next,
            None => {
                handle.dispose();
                return Err(Error::Overflow);
            }
        }
    }
    Ok(total)
}

/// Seedless fold; `NoElements` on an empty source.
pub async fn reduce<S, F>(source: &S, f: F, cancel: &CancellationToken) -> Result<S::Item>
where
    S: AsyncSequence + ?Sized,
    F: Fn(S::Item, S::Item) -> S::Item,
{
    let mut handle = source.enumerate(cancel);
    let Some(mut acc) = handle.next_item().await? else {
        return Err(Error::NoElements);
    };
    while let Some(item) = handle.next_item().await? {
        acc = f(acc, item);
    }
    Ok(acc)
}

pub async fn fold<S, A, F>(source: &S, seed: A, f: F, cancel: &CancellationToken) -> Result<A>
where
    S: AsyncSequence + ?Sized,
    F: Fn(A, S::Item) -> A,
{
    let mut handle = source.enumerate(cancel);
    let mut acc = seed;
    while let Some(item) = handle.next_item().await? {
        acc = f(acc, item);
    }
    Ok(acc)
}

/// `true` as soon as one element matches; stops pulling there.
pub async fn any<S, P>(source: &S, predicate: P, cancel: &CancellationToken) -> Result<bool>
where
    S: AsyncSequence + ?Sized,
    P: Fn(&S::Item) -> bool,
{
    let mut handle = source.enumerate(cancel);
    while let Some(item) = handle.next_item().await? {
        if predicate(&item) {
            handle.dispose();
            return Ok(true);
        }
    }
    Ok(false)
}

/// `false` as soon as one element fails; stops pulling there.
pub async fn all<S, P>(source: &S, predicate: P, cancel: &CancellationToken) -> Result<bool>
where
    S: AsyncSequence + ?Sized,
    P: Fn(&S::Item) -> bool,
{
    let mut handle = source.enumerate(cancel);
    while let Some(item) = handle.next_item().await? {
        if !predicate(&item) {
            handle.dispose();
            return Ok(false);
        }
    }
    Ok(true)
}

pub async fn for_each<S, F>(source: &S, mut f: F, cancel: &CancellationToken) -> Result<()>
where
    S: AsyncSequence + ?Sized,
    F: FnMut(S::Item),
{
    let mut handle = source.enumerate(cancel);
    while let Some(item) = handle.next_item().await? {
        f(item);
    }
    Ok(())
}
