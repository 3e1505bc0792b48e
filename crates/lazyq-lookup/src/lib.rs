#![forbid(unsafe_code)]
//! lazyq-lookup: the hash grouping index behind join, group-join, group-by,
//! to-lookup and to-dictionary, plus the dedup set used by union/distinct.
//!
//! These are the only structures in lazyq that buffer more than one element
//! (together with the ordering engine's sort buffer). They are built once per
//! enumeration, read-only afterwards, and never shared between enumerations.

pub mod builder;
pub mod dictionary;
pub mod grouping;
pub mod lookup;
pub mod set;

pub use builder::{build_lookup, ElementFn, KeyFn, LookupBuilder, LookupSpec};
pub use dictionary::Dictionary;
pub use grouping::Grouping;
pub use lookup::Lookup;
pub use set::KeySet;
