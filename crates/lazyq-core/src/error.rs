use std::fmt::Display;

use thiserror::Error;

/// Canonical result for every lazyq crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("required argument '{0}' was not supplied")]
    ArgumentNull(&'static str),

    #[error("sequence contains no elements")]
    NoElements,

    #[error("sequence contains more than one element")]
    MoreThanOneElement,

    #[error("an element with the same key has already been added")]
    DuplicateKey,

    #[error("the operation was cancelled")]
    Cancelled,

    #[error("arithmetic operation resulted in an overflow")]
    Overflow,

    // Failures reported by fallible user callbacks (`try_filter`, `try_map`, ...).
    #[error("callback failed: {0}")]
    Callback(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a user-callback failure.
    pub fn callback(e: impl Display) -> Self {
        Error::Callback(e.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
