//! Ordering engine: buffer, key once per element per level, stable sort of
//! a position permutation, then stream in permutation order.

mod keys;
mod order;

pub use order::OrderBy;
