//! Entry traits and implementations.
//!
//! This module defines the [`Entry`] tagged variant and the traits behind
//! it, which provide a unified interface over trees of files and directories
//! regardless of where they come from (the local filesystem, an in-memory
//! tree for testing, or anything else a front end can hand over).
//!

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::{LocalDirectory, LocalFile};
#[cfg(feature = "mock")]
pub use self::mock::{MockDirectory, MockFile};
use crate::error::Result;
use async_stream::stream;
use async_trait::async_trait;
use futures::Stream;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::pin::Pin;
use std::sync::Arc;
use time::OffsetDateTime;

/// Shared handle to a leaf entry's byte source.
pub type FileHandle = Arc<dyn FileEntry>;
/// Shared handle to a directory entry.
pub type DirectoryHandle = Arc<dyn DirectoryEntry>;
/// Lazy, finite sequence of child entries.
pub type EntryStream<'a> = Pin<Box<dyn Stream<Item = Result<Entry>> + Send + 'a>>;

/// A file-system object handed over by a front end: either a leaf file or a
/// directory that can enumerate its children.
///
/// Cloning an `Entry` is cheap (reference counted) and never copies file
/// contents.
#[derive(Clone)]
pub enum Entry {
    File(FileHandle),
    Directory(DirectoryHandle),
}
impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => file.name(),
            Self::Directory(dir) => dir.name(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}
impl Debug for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::File(file) => f.debug_tuple("File").field(&file.name()).finish(),
            Self::Directory(dir) => f.debug_tuple("Directory").field(&dir.name()).finish(),
        }
    }
}

/// Metadata of a leaf entry, materialized when the entry is walked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStat {
    /// File size in bytes
    pub size: u64,
    /// Content type reported by the source, if it knows one
    pub reported_type: Option<String>,
    /// Last modified timestamp, if the source tracks one
    pub modified: Option<OffsetDateTime>,
}

/// A leaf entry.
///
/// # Examples
///
/// ```no_run
/// use filematch_entry::{Entry, error::Result};
///
/// async fn total_size(entry: &Entry) -> Result<u64> {
///     match entry {
///         Entry::File(file) => Ok(file.stat().await?.size),
///         Entry::Directory(_) => Ok(0),
///     }
/// }
/// ```
#[async_trait]
pub trait FileEntry: Send + Sync {
    /// Base name of the file (no directory components).
    fn name(&self) -> &str;

    /// Fetch the file's metadata.
    ///
    /// Fails if the file vanished or cannot be accessed.
    async fn stat(&self) -> Result<FileStat>;

    /// Read the complete file contents into memory.
    ///
    /// There is no streaming or chunking; callers get one buffer.
    async fn read(&self) -> Result<Vec<u8>>;
}

/// A directory entry.
pub trait DirectoryEntry: Send + Sync {
    /// Name of the directory itself (becomes a path segment of its children).
    fn name(&self) -> &str;

    /// Start enumerating children from the beginning.
    ///
    /// Every call returns a fresh reader; enumeration is restartable from the
    /// start but never resumable mid-way.
    fn reader(&self) -> Box<dyn DirectoryReader + '_>;
}

/// Paginated child enumeration.
#[async_trait]
pub trait DirectoryReader: Send {
    /// Read the next batch of children.
    ///
    /// An empty batch signals that there are no more children; callers must
    /// keep asking until they receive one, since children may arrive across
    /// any number of batches.
    async fn read_batch(&mut self) -> Result<Vec<Entry>>;
}

/// Enumerate all children of a directory as a lazy [`Stream`].
///
/// Wraps the batch-oriented [`DirectoryReader`] so consumers can use plain
/// iteration instead of re-invoking the reader themselves. The stream ends
/// after the first empty batch. A failed batch is yielded as an error and
/// also ends the stream (a broken reader won't recover by asking again).
///
/// # Examples
///
/// ```no_run
/// use futures::StreamExt;
/// use filematch_entry::{DirectoryEntry, children};
///
/// async fn count(dir: &dyn DirectoryEntry) -> usize {
///     children(dir).filter(|c| std::future::ready(c.is_ok())).count().await
/// }
/// ```
pub fn children(dir: &dyn DirectoryEntry) -> EntryStream<'_> {
    Box::pin(stream! {
        let mut reader = dir.reader();
        'batches: loop {
            match reader.read_batch().await {
                Ok(batch) if batch.is_empty() => break 'batches,
                Ok(batch) => {
                    for entry in batch {
                        yield Ok(entry);
                    }
                },
                Err(e) => {
                    yield Err(e);
                    break 'batches;
                },
            }
        }
    })
}
