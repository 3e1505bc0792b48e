#![forbid(unsafe_code)]
//! lazyq-core: the enumeration protocol every lazyq operator honors.
//!
//! Contents:
//! - `AsyncEnumerator` / `AsyncSequence`: the pull protocol (suspension handle
//!   and the thing that hands them out).
//! - `Stage`: the Unstarted → Running → Disposed lifecycle wrapper.
//! - `KeyEquality` / `KeyOrdering`: explicit key collaborators.
//! - `Error`, `QueryConfig`, tracing hooks.
//!
//! No executor lives here; the protocol is poll-based and single-threaded
//! cooperative.

pub mod config;
pub mod enumerator;
pub mod error;
pub mod hash;
pub mod ordering;
pub mod prelude;
pub mod stage;
pub mod trace;
pub mod upstream;

pub use tokio_util::sync::CancellationToken;

pub use enumerator::{AsyncEnumerator, AsyncEnumeratorExt, AsyncSequence, BoxEnumerator};
pub use error::{Error, Result};
pub use stage::{Stage, StageLogic, StageState};
pub use upstream::Upstream;
