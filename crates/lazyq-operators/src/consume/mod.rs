//! Terminal operators: drive an enumeration to (partial) completion and
//! return a value.
//!
//! Each one enumerates its source exactly once. Handles are disposed on
//! every exit path, early returns included.

mod aggregate;
mod collect;
mod element;

pub use aggregate::{all, any, count, fold, for_each, reduce, sum, CheckedSum};
pub use collect::{to_dictionary, to_lookup, to_vec};
pub use element::{
    first, first_or_default, last, last_or_default, single, single_or_default,
};
