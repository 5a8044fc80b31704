//! File and directory entries.
//!
//! A front end (a drag-and-drop area, a file picker, a command line) hands
//! over a set of [`Entry`] values: leaf files that can report their metadata
//! and produce their bytes, and directories that enumerate their children in
//! batches. Everything downstream works against these traits only.

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::{
    DirectoryEntry, DirectoryHandle, DirectoryReader, Entry, EntryStream, FileEntry, FileHandle, FileStat, children,
};
pub use crate::backend::{LocalDirectory, LocalFile};
#[cfg(feature = "mock")]
pub use crate::backend::{MockDirectory, MockFile};
pub use crate::path::join as join_path;
pub use crate::path::validate as validate_path;
