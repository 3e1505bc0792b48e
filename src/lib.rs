#![forbid(unsafe_code)]
//! lazyq: lazily-evaluated, cancellable sequence operators over pull-based
//! async sources.
//!
//! ```ignore
//! use lazyq::prelude::*;
//!
//! let cancel = CancellationToken::new();
//! let evens = from_vec(vec![1, 2, 3, 4]).filter(|x| x % 2 == 0).map(|x| x * 10);
//! assert_eq!(evens.to_vec(&cancel).await?, vec![20, 40]);
//! ```
//!
//! Crates:
//! - `lazyq-core`: enumeration protocol, lifecycle, errors, config, collaborators
//! - `lazyq-lookup`: hash grouping index, dedup set, dictionary
//! - `lazyq-operators`: sources, combinators, terminal operators

pub use lazyq_core::{
    AsyncEnumerator, AsyncEnumeratorExt, AsyncSequence, BoxEnumerator, CancellationToken, Error,
    Result,
};
pub use lazyq_core::config::QueryConfig;
pub use lazyq_lookup::{Dictionary, Grouping, KeySet, Lookup, LookupSpec};
pub use lazyq_operators::SequenceExt;

pub mod prelude {
    pub use lazyq_operators::prelude::*;
}
