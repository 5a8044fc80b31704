//! Find files by product code and package them.
//!
//! A [`Session`] ties the pieces together: entries handed over by the user are
//! [walked](walk) into [`FileDescriptor`]s, [matched](matcher) against product
//! codes, and the matches [packed](pack) into a ZIP archive, with
//! [progress](progress) published along the way and every step ending in a
//! user-presentable [`Outcome`].

pub mod error;
mod file;
pub mod matcher;
pub mod messages;
mod operation;
pub mod outcome;
pub mod pack;
pub mod progress;
mod session;
pub mod walk;

pub use crate::file::FileDescriptor;
pub use crate::matcher::{MatchedFile, Matches, ProductCode};
pub use crate::operation::{Operation, OperationGuard, OperationKind, OperationState};
pub use crate::outcome::{Outcome, Severity};
pub use crate::session::{Session, SessionOptions};

/// Top-level entries walked at the same time unless configured otherwise.
pub const DEFAULT_WALK_CONCURRENCY: usize = 8;
