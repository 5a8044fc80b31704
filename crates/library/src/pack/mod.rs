//! Archive packaging.
//!
//! Packs a set of files into a single in-memory ZIP archive, keeping each
//! file's relative path as its entry name. Files are read fully into memory
//! one after the other, in order; nothing is spooled to disk.
//!
//! Packaging is all-or-nothing. If any file can't be read (or the archive
//! can't be written) the whole operation fails and no archive is produced.
//!
//! The primary entry point is [`pack_stream`], which reports each file as it
//! is added. [`pack`] drives a [`ProgressReporter`] from those events and
//! returns the finished [`Archive`], ready to be handed to a
//! [`DownloadTarget`].

mod download;
pub mod error;
mod stream;

pub use self::download::{Delivered, DirectoryTarget, DownloadTarget, MemoryTarget};
pub use self::stream::{PackEvent, pack_stream};
use crate::FileDescriptor;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::progress::{Phase, ProgressReporter};
use derive_more::Display;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use zip::CompressionMethod;

/// Name given to archives unless configured otherwise.
pub const DEFAULT_ARCHIVE_NAME: &str = "matched_files.zip";

/// How each archive entry is compressed.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    #[display("deflated")]
    Deflated,
    #[display("stored")]
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> CompressionMethod {
        match self {
            Self::Deflated => CompressionMethod::Deflated,
            Self::Stored => CompressionMethod::Stored,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// File name of the archive, e.g. `matched_files.zip`.
    pub name: String,
    pub compression: Compression,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_ARCHIVE_NAME.to_string(),
            compression: Compression::default(),
        }
    }
}

/// A finished archive, held entirely in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Archive {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Archive {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive").field("name", &self.name).field("bytes", &self.bytes.len()).finish()
    }
}

/// Pack `files` into an archive, reporting progress as the "creating zip"
/// phase of `progress`.
///
/// On success the reporter is taken to 100% and reset; on failure it is reset
/// straight away.
///
/// # Errors
///
/// Returns [`Exn<LibraryErrorKind::Pack>`](LibraryErrorKind::Pack) raised from
/// an inner [`Exn<pack::error::ErrorKind>`](error::ErrorKind).
#[instrument(skip_all, fields(files = files.len(), name = %options.name))]
pub async fn pack(
    files: &[FileDescriptor],
    options: &ArchiveOptions,
    progress: &ProgressReporter,
) -> LibraryResult<Archive> {
    progress.begin(Phase::CreatingZip);
    let mut events = std::pin::pin!(pack_stream(files, options));
    while let Some(event) = events.next().await {
        match event {
            Ok(PackEvent::Started { .. }) => {},
            Ok(PackEvent::Added { completed, total, .. }) => progress.advance(completed, total),
            Ok(PackEvent::Finished(archive)) => {
                progress.finish();
                return Ok(archive);
            },
            Err(e) => {
                progress.fail();
                return Err(e);
            },
        }
    }
    // The stream always ends with either an archive or an error.
    progress.fail();
    exn::bail!(LibraryErrorKind::Pack);
}
