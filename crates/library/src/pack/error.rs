//! Error types for the [`pack`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// A packaging error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for packaging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a packaging failure.
///
/// Any of these aborts the whole archive; there is no partial result.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// There were no files to put in the archive.
    #[display("no files to archive")]
    Empty,
    /// A selected file's contents could not be read.
    #[display("could not read file: {_0}")]
    Read(#[error(not(source))] String),
    /// A file's path can't be used as an archive entry name.
    #[display("invalid archive entry path: {_0}")]
    InvalidPath(#[error(not(source))] String),
    /// Writing or finalizing the archive failed.
    #[display("could not write archive")]
    Archive,
    /// The archive name can't be used as a file name.
    #[display("invalid archive name: {_0}")]
    InvalidName(#[error(not(source))] String),
    /// The finished archive could not be written to its destination.
    #[display("could not save archive to {_0}")]
    Deliver(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Deliver(_))
    }
}
