//! Command-line Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    /// An input given on the command line couldn't be opened.
    #[display("could not open input: {}", _0.display())]
    Input(#[error(not(source))] PathBuf),
    #[display("could not read product codes from {_0}")]
    Codes(#[error(not(source))] String),
}
