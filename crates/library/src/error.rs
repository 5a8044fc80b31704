//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each module with fallible operations
//! has its own `error` module; failures are raised into one of these kinds at
//! the public boundary.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Building the archive failed; see [`pack::error`](crate::pack::error).
    #[display("could not create the archive")]
    Pack,
    /// Messages aren't available in the requested language.
    #[display("unknown language: {_0}")]
    UnknownLanguage(#[error(not(source))] String),
}
