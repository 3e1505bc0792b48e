use lazyq_core::enumerator::{AsyncEnumerator, AsyncEnumeratorExt, AsyncSequence};
use lazyq_core::error::{Error, Result};
use tokio_util::sync::CancellationToken;

pub async fn first<S>(source: &S, cancel: &CancellationToken) -> Result<S::Item>
where
    S: AsyncSequence + ?Sized,
{
    first_or_none(source, cancel).await?.ok_or(Error::NoElements)
}

pub async fn first_or_default<S>(source: &S, cancel: &CancellationToken) -> Result<S::Item>
where
    S: AsyncSequence + ?Sized,
    S::Item: Default,
{
    Ok(first_or_none(source, cancel).await?.unwrap_or_default())
}

async fn first_or_none<S>(source: &S, cancel: &CancellationToken) -> Result<Option<S::Item>>
where
    S: AsyncSequence + ?Sized,
{
    let mut handle = source.enumerate(cancel);
    let item = handle.next_item().await?;
    handle.dispose();
    Ok(item)
}

pub async fn last<S>(source: &S, cancel: &CancellationToken) -> Result<S::Item>
where
    S: AsyncSequence + ?Sized,
{
    last_or_none(source, cancel).await?.ok_or(Error::NoElements)
}

pub async fn last_or_default<S>(source: &S, cancel: &CancellationToken) -> Result<S::Item>
where
    S: AsyncSequence + ?Sized,
    S::Item: Default,
{
    Ok(last_or_none(source, cancel).await?.unwrap_or_default())
}

async fn last_or_none<S>(source: &S, cancel: &CancellationToken) -> Result<Option<S::Item>>
where
    S: AsyncSequence + ?Sized,
{
    let mut handle = source.enumerate(cancel);
    let mut last = None;
    while let Some(item) = handle.next_item().await? {
        last = Some(item);
    }
    Ok(last)
}

/// The only element. `NoElements` when empty, `MoreThanOneElement` as soon
/// as a second element is observed.
pub async fn single<S>(source: &S, cancel: &CancellationToken) -> Result<S::Item>
where
    S: AsyncSequence + ?Sized,
{
    single_or_none(source, cancel).await?.ok_or(Error::NoElements)
}

/// Like [`single`], but an empty source yields the default value. Two or
/// more elements are still an error.
pub async fn single_or_default<S>(source: &S, cancel: &CancellationToken) -> Result<S::Item>
where
    S: AsyncSequence + ?Sized,
    S::Item: Default,
{
    Ok(single_or_none(source, cancel).await?.unwrap_or_default())
}

async fn single_or_none<S>(source: &S, cancel: &CancellationToken) -> Result<Option<S::Item>>
where
    S: AsyncSequence + ?Sized,
{
    let mut handle = source.enumerate(cancel);
    let Some(item) = handle.next_item().await? else {
        return Ok(None);
    };
    let second = handle.move_next().await?;
    handle.dispose();
    if second {
        return Err(Error::MoreThanOneElement);
    }
    Ok(Some(item))
}
