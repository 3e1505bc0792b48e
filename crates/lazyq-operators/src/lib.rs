#![forbid(unsafe_code)]
//! lazyq-operators: sources, lazy combinators and terminal operators.
//!
//! Every combinator is a `Stage` around its upstream(s): nothing runs until
//! the consumer advances, upstream handles are opened on the first advance
//! and released exactly once. Most users only need `prelude::*`.

pub mod append;
mod chain;
pub mod concat;
pub mod consume;
pub mod distinct;
pub mod ext;
pub mod filter;
pub mod group;
pub mod join;
pub mod map;
pub mod sort;
pub mod source;
pub mod traits;
pub mod union;

pub use append::AppendPrepend;
pub use concat::Concat;
pub use distinct::Distinct;
pub use ext::SequenceExt;
pub use filter::{Filter, FilterMap};
pub use group::GroupBy;
pub use join::{GroupJoin, Join};
pub use map::Map;
pub use sort::OrderBy;
pub use source::{
    empty, from_iter, from_stream, from_vec, range, repeat, try_from_stream, Empty, MemorySource,
    Range, Repeat, StreamSource,
};
pub use union::Union;

pub mod prelude {
    pub use crate::ext::SequenceExt;
    pub use crate::source::{empty, from_iter, from_stream, from_vec, range, repeat};
    pub use lazyq_core::prelude::*;
    pub use lazyq_lookup::{Dictionary, Grouping, Lookup};
}
