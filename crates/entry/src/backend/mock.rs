//! In-memory entries for testing.

use crate::backend::{DirectoryEntry, DirectoryReader, Entry, FileEntry, FileStat};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory file for testing.
///
/// Failures can be injected separately for metadata ([`unreadable`](Self::unreadable))
/// and for contents ([`unreadable_content`](Self::unreadable_content)), which
/// lets tests exercise the walker's and the packager's failure policies
/// independently.
///
/// # Examples
///
/// ```
/// use filematch_entry::MockFile;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let entry = MockFile::new("Invoice_DCA-4901.pdf", "%PDF-1.7").into_entry();
/// assert_eq!(entry.name(), "Invoice_DCA-4901.pdf");
/// # }
/// ```
#[derive(Debug)]
pub struct MockFile {
    name: String,
    data: Vec<u8>,
    reported_type: Option<String>,
    stat_fails: bool,
    read_fails: bool,
    reads: AtomicUsize,
}
impl MockFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            reported_type: None,
            stat_fails: false,
            read_fails: false,
            reads: AtomicUsize::new(0),
        }
    }

    /// Report a content type, like a browser would for a dropped file.
    pub fn with_type(mut self, reported_type: impl Into<String>) -> Self {
        self.reported_type = Some(reported_type.into());
        self
    }

    /// Make metadata lookups fail (the file "vanished" before it was walked).
    pub fn unreadable(mut self) -> Self {
        self.stat_fails = true;
        self
    }

    /// Make content reads fail while metadata stays available.
    pub fn unreadable_content(mut self) -> Self {
        self.read_fails = true;
        self
    }

    /// Number of times [`read()`](FileEntry::read) has been called.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn into_entry(self) -> Entry {
        Entry::File(Arc::new(self))
    }
}

#[async_trait]
impl FileEntry for MockFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stat(&self) -> Result<FileStat> {
        if self.stat_fails {
            exn::bail!(ErrorKind::Unreadable(self.name.clone()));
        }
        Ok(FileStat {
            size: self.data.len() as u64,
            reported_type: self.reported_type.clone(),
            modified: None,
        })
    }

    async fn read(&self) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if self.stat_fails || self.read_fails {
            exn::bail!(ErrorKind::Unreadable(self.name.clone()));
        }
        Ok(self.data.clone())
    }
}

/// In-memory directory for testing.
///
/// Children are handed out in batches of [`with_batch_size`](Self::with_batch_size)
/// entries (default 2, deliberately small so that multi-batch enumeration is
/// always exercised).
///
/// # Examples
///
/// ```
/// use filematch_entry::{MockDirectory, MockFile};
///
/// let entry = MockDirectory::new("folderA", [
///     MockFile::new("a.pdf", "a").into_entry(),
///     MockDirectory::new("sub", [MockFile::new("report.pdf", "r").into_entry()]).into_entry(),
/// ])
/// .into_entry();
/// assert!(entry.is_directory());
/// ```
#[derive(Debug)]
pub struct MockDirectory {
    name: String,
    children: Vec<Entry>,
    batch_size: usize,
    fails_after: Option<usize>,
}
impl MockDirectory {
    pub fn new(name: impl Into<String>, children: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            name: name.into(),
            children: children.into_iter().collect(),
            batch_size: 2,
            fails_after: None,
        }
    }

    /// Panics if `batch_size` is zero. If test setup is wrong, then test
    /// should not pass.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        assert!(batch_size > 0, "MockDirectory::with_batch_size: batch size must be positive");
        self.batch_size = batch_size;
        self
    }

    /// Successfully return `batches` batches, then fail every read after that.
    pub fn failing_after(mut self, batches: usize) -> Self {
        self.fails_after = Some(batches);
        self
    }

    pub fn into_entry(self) -> Entry {
        Entry::Directory(Arc::new(self))
    }
}

impl DirectoryEntry for MockDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn reader(&self) -> Box<dyn DirectoryReader + '_> {
        Box::new(MockReader { dir: self, position: 0, batches: 0 })
    }
}

struct MockReader<'a> {
    dir: &'a MockDirectory,
    position: usize,
    batches: usize,
}

#[async_trait]
impl DirectoryReader for MockReader<'_> {
    async fn read_batch(&mut self) -> Result<Vec<Entry>> {
        if self.dir.fails_after.is_some_and(|limit| self.batches >= limit) {
            exn::bail!(ErrorKind::Unreadable(self.dir.name.clone()));
        }
        self.batches += 1;
        let end = (self.position + self.dir.batch_size).min(self.dir.children.len());
        let batch = self.dir.children[self.position..end].to_vec();
        self.position = end;
        Ok(batch)
    }
}
