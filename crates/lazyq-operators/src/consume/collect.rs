use lazyq_core::config::QueryConfig;
use lazyq_core::enumerator::{AsyncEnumerator, AsyncEnumeratorExt, AsyncSequence};
use lazyq_core::error::Result;
use lazyq_core::hash::KeyEquality;
use lazyq_lookup::{build_lookup, Dictionary, ElementFn, KeyFn, Lookup};
use tokio_util::sync::CancellationToken;

/// Collect every element, pre-sized from the source's exact length if known.
pub async fn to_vec<S>(source: &S, cancel: &CancellationToken) -> Result<Vec<S::Item>>
where
    S: AsyncSequence + ?Sized,
{
    let mut out = Vec::with_capacity(source.len_hint().unwrap_or(0));
    let mut handle = source.enumerate(cancel);
    while let Some(item) = handle.next_item().await? {
        out.push(item);
    }
    Ok(out)
}

/// Group every element by key. Null keys are kept as their own grouping.
pub async fn to_lookup<S, K, E, Q>(
    source: &S,
    key_selector: KeyFn<S::Item, K>,
    element_selector: ElementFn<S::Item, E>,
    equality: Q,
    cfg: &QueryConfig,
    cancel: &CancellationToken,
) -> Result<Lookup<K, E, Q>>
where
    S: AsyncSequence + ?Sized,
    Q: KeyEquality<K>,
{
    build_lookup(source, key_selector, element_selector, equality, cfg, cancel).await
}

/// Unique-key map in encounter order. Fails with `DuplicateKey` on the first
/// element whose key is already present; elements before it are discarded.
pub async fn to_dictionary<S, K, V, Q>(
    source: &S,
    key_selector: KeyFn<S::Item, K>,
    value_selector: ElementFn<S::Item, V>,
    equality: Q,
    cfg: &QueryConfig,
    cancel: &CancellationToken,
) -> Result<Dictionary<K, V, Q>>
where
    S: AsyncSequence + ?Sized,
    Q: KeyEquality<K>,
{
    let mut dictionary = Dictionary::with_config(equality, cfg);
    let mut handle = source.enumerate(cancel);
    while let Some(item) = handle.next_item().await? {
        let key = key_selector(&item);
        if let Err(e) = dictionary.insert(key, value_selector(item)) {
            handle.dispose();
            return Err(e);
        }
    }
    Ok(dictionary)
}
