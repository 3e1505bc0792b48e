//! Tracing hooks (feature: `tracing`).
//!
//! Call sites use these helpers so the `cfg` switch lives in one place.
//! With the feature disabled every hook compiles to nothing.

use crate::stage::DisposeReason;

#[cfg(feature = "tracing")]
pub fn stage_opened(stage: &'static str) {
    tracing::trace!(target: "lazyq::stage", stage, "opened upstream");
}

#[cfg(not(feature = "tracing"))]
pub fn stage_opened(_stage: &'static str) {}

#[cfg(feature = "tracing")]
pub fn stage_disposed(stage: &'static str, reason: DisposeReason) {
    tracing::debug!(target: "lazyq::stage", stage, ?reason, "disposed");
}

#[cfg(not(feature = "tracing"))]
pub fn stage_disposed(_stage: &'static str, _reason: DisposeReason) {}

#[cfg(feature = "tracing")]
pub fn index_resized(old_buckets: usize, new_buckets: usize, groupings: usize) {
    tracing::debug!(
        target: "lazyq::lookup",
        old_buckets,
        new_buckets,
        groupings,
        "resized bucket array"
    );
}

#[cfg(not(feature = "tracing"))]
pub fn index_resized(_old_buckets: usize, _new_buckets: usize, _groupings: usize) {}

#[cfg(feature = "tracing")]
pub fn chain_fallback(kind: &'static str, len: usize) {
    tracing::trace!(target: "lazyq::chain", kind, len, "chain ceiling reached; nesting");
}

#[cfg(not(feature = "tracing"))]
pub fn chain_fallback(_kind: &'static str, _len: usize) {}

#[cfg(feature = "tracing")]
pub fn index_built(stage: &'static str, groupings: usize) {
    tracing::debug!(target: "lazyq::lookup", stage, groupings, "index built");
}

#[cfg(not(feature = "tracing"))]
pub fn index_built(_stage: &'static str, _groupings: usize) {}
