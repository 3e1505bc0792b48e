//! Convenient re-exports for downstream crates.

pub use crate::config::QueryConfig;
pub use crate::enumerator::{
    AsyncEnumerator, AsyncEnumeratorExt, AsyncSequence, BoxEnumerator, SharedSequence,
};
pub use crate::error::{Error, Result};
pub use crate::hash::{DefaultEquality, KeyEquality, OptionalKey};
pub use crate::ordering::{DefaultOrder, DefaultOrdering, KeyOrdering};
pub use crate::stage::{Stage, StageLogic, StageState};
pub use crate::upstream::Upstream;
pub use tokio_util::sync::CancellationToken;
