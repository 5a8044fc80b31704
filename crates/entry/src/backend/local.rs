//! Local filesystem entries.
//!
//! This module provides [`Entry`] implementations backed by the local
//! filesystem. All access goes through `tokio::fs` for async I/O.

use crate::backend::{DirectoryEntry, DirectoryReader, Entry, FileEntry, FileStat};
use crate::error::{Error, ErrorKind, Result};
use async_trait::async_trait;
use exn::Exn;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::fs::{self, DirEntry, ReadDir};

/// Maximum number of children returned by a single [`DirectoryReader::read_batch`] call.
const BATCH_SIZE: usize = 100;

/// Derive an entry name from the last component of `path`.
fn name_of(path: &Path) -> Result<String> {
    match path.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => exn::bail!(ErrorKind::InvalidPath(path.display().to_string())),
    }
}

impl Entry {
    /// Open a path on the local filesystem as an entry.
    ///
    /// Relative paths are resolved against the current directory so that
    /// paths such as `.` still get a meaningful name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if nothing exists at `path`,
    /// or [`Unsupported`](ErrorKind::Unsupported) if it is neither a regular
    /// file nor a directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filematch_entry::Entry;
    ///
    /// # async fn example() -> filematch_entry::error::Result<()> {
    /// let entry = Entry::open("/path/to/dropped/folder").await?;
    /// assert!(entry.is_directory());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = fs::canonicalize(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        let metadata = fs::metadata(&path).await.map_err(|e| ErrorKind::from_io(e, &path))?;
        if metadata.is_dir() {
            return Ok(Self::Directory(Arc::new(LocalDirectory::new(path)?)));
        }
        if metadata.is_file() {
            return Ok(Self::File(Arc::new(LocalFile::new(path)?)));
        }
        exn::bail!(ErrorKind::Unsupported(path));
    }
}

/// A regular file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFile {
    name: String,
    path: PathBuf,
}
impl LocalFile {
    /// Create a file entry for `path`; the name is its last component.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Ok(Self { name: name_of(&path)?, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileEntry for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stat(&self) -> Result<FileStat> {
        let metadata = fs::metadata(&self.path).await.map_err(|e| ErrorKind::from_io(e, &self.path))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::Unsupported(self.path.clone()));
        }
        Ok(FileStat {
            size: metadata.len(),
            // The filesystem has no notion of content type; leave that to the classifier.
            reported_type: None,
            modified: metadata.modified().ok().map(OffsetDateTime::from),
        })
    }

    async fn read(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path).await.map_err(|e| ErrorKind::from_io(e, &self.path))?)
    }
}

/// A directory on the local filesystem.
///
/// Symbolic links beneath it are followed, except for links that lead back
/// into a directory that is already being walked.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    name: String,
    path: PathBuf,
    /// Resolved paths of this directory and of every directory above it.
    lineage: Arc<[PathBuf]>,
}
impl LocalDirectory {
    /// Create a directory entry for `path`; the name is its last component.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Ok(Self { name: name_of(&path)?, lineage: Arc::from([path.clone()]), path })
    }

    fn child(&self, path: PathBuf, resolved: PathBuf) -> Result<Self> {
        let mut lineage = self.lineage.to_vec();
        lineage.push(resolved);
        Ok(Self { name: name_of(&path)?, path, lineage: lineage.into() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectoryEntry for LocalDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn reader(&self) -> Box<dyn DirectoryReader + '_> {
        Box::new(LocalReader { dir: self, entries: None, interrupted: None, finished: false })
    }
}

struct LocalReader<'a> {
    dir: &'a LocalDirectory,
    /// Opened lazily on the first batch, so that creating a reader never fails.
    entries: Option<ReadDir>,
    /// A failure that cut the previous batch short, reported on the next read.
    interrupted: Option<Error>,
    finished: bool,
}
impl LocalReader<'_> {
    async fn convert(&self, entry: DirEntry) -> Result<Entry> {
        let path = entry.path();
        let is_dir = match entry.file_type().await {
            Ok(ft) if ft.is_symlink() => fs::metadata(&path).await.is_ok_and(|m| m.is_dir()),
            Ok(ft) => ft.is_dir(),
            Err(_) => false,
        };
        if !is_dir {
            // Files, links to files, dangling links, sockets and the like. stat()
            // fails for anything that isn't a readable regular file, and the
            // walker decides what to do with those.
            return Ok(Entry::File(Arc::new(LocalFile::new(path)?)));
        }
        match fs::canonicalize(&path).await {
            Ok(resolved) if !self.dir.lineage.contains(&resolved) => {
                Ok(Entry::Directory(Arc::new(self.dir.child(path, resolved)?)))
            },
            Ok(_) => {
                tracing::warn!(path = %path.display(), "Not following link back into a parent directory");
                Ok(Entry::File(Arc::new(LocalFile::new(path)?)))
            },
            Err(_) => Ok(Entry::File(Arc::new(LocalFile::new(path)?))),
        }
    }

    /// Hand out what was read before `err`, keeping the error for the next call.
    fn interrupt(&mut self, batch: Vec<Entry>, err: Error) -> Result<Vec<Entry>> {
        if batch.is_empty() {
            self.finished = true;
            return Err(err);
        }
        self.interrupted = Some(err);
        Ok(batch)
    }
}

#[async_trait]
impl DirectoryReader for LocalReader<'_> {
    async fn read_batch(&mut self) -> Result<Vec<Entry>> {
        if let Some(err) = self.interrupted.take() {
            self.finished = true;
            return Err(err);
        }
        if self.finished {
            return Ok(Vec::new());
        }
        let dir = self.dir;
        let path = dir.path();
        if self.entries.is_none() {
            let opened = fs::read_dir(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
            self.entries = Some(opened);
        }
        let mut batch = Vec::with_capacity(BATCH_SIZE);
        // Keep going until the batch is full or the directory is exhausted, so
        // that an empty batch only ever means "no more children".
        while batch.len() < BATCH_SIZE {
            let Some(entries) = self.entries.as_mut() else {
                break;
            };
            match entries.next_entry().await {
                Ok(Some(entry)) => batch.push(self.convert(entry).await?),
                Ok(None) => {
                    self.finished = true;
                    break;
                },
                Err(e) => return self.interrupt(batch, Exn::from(ErrorKind::from_io(e, path))),
            }
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::children;
    use futures::TryStreamExt;

    fn write(root: &Path, relative: &str, data: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, data).unwrap();
    }

    #[test]
    fn test_name_of() {
        assert_eq!(name_of(Path::new("/a/b/report.pdf")).unwrap(), "report.pdf");
        assert!(name_of(Path::new("/")).is_err());
    }

    #[tokio::test]
    async fn test_open_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "report.pdf", b"%PDF-1.7");
        let entry = Entry::open(temp_dir.path().join("report.pdf")).await.unwrap();
        let Entry::File(file) = entry else { panic!("expected a file entry") };
        assert_eq!(file.name(), "report.pdf");
        let stat = file.stat().await.unwrap();
        assert_eq!(stat.size, 8);
        assert!(stat.reported_type.is_none());
        assert!(stat.modified.is_some());
        assert_eq!(file.read().await.unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_open_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("folderA")).unwrap();
        let entry = Entry::open(temp_dir.path().join("folderA")).await.unwrap();
        assert!(entry.is_directory());
        assert_eq!(entry.name(), "folderA");
    }

    #[tokio::test]
    async fn test_open_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = Entry::open(temp_dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_children() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "root/a.pdf", b"a");
        write(temp_dir.path(), "root/b.png", b"b");
        write(temp_dir.path(), "root/sub/c.txt", b"c");
        let dir = LocalDirectory::new(temp_dir.path().join("root")).unwrap();
        let mut names: Vec<_> = children(&dir).map_ok(|e| e.name().to_string()).try_collect().await.unwrap();
        names.sort();
        assert_eq!(names, ["a.pdf", "b.png", "sub"]);
    }

    #[tokio::test]
    async fn test_children_across_batches() {
        let temp_dir = tempfile::tempdir().unwrap();
        for i in 0..(BATCH_SIZE * 2 + 5) {
            write(temp_dir.path(), &format!("root/file-{i}.txt"), b"x");
        }
        let dir = LocalDirectory::new(temp_dir.path().join("root")).unwrap();
        let mut reader = dir.reader();
        assert_eq!(reader.read_batch().await.unwrap().len(), BATCH_SIZE);
        assert_eq!(reader.read_batch().await.unwrap().len(), BATCH_SIZE);
        assert_eq!(reader.read_batch().await.unwrap().len(), 5);
        assert!(reader.read_batch().await.unwrap().is_empty());
        // Still empty after the end.
        assert!(reader.read_batch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reader_restarts() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "root/a.pdf", b"a");
        let dir = LocalDirectory::new(temp_dir.path().join("root")).unwrap();
        let first: Vec<Entry> = children(&dir).try_collect().await.unwrap();
        let second: Vec<Entry> = children(&dir).try_collect().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_children_of_vanished_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = LocalDirectory::new(temp_dir.path().join("vanished")).unwrap();
        let results: Vec<_> = futures::StreamExt::collect(children(&dir)).await;
        assert_eq!(results.len(), 1);
        assert!(matches!(&*results.into_iter().next().unwrap().unwrap_err(), ErrorKind::NotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_children_follow_symlinks() {
        use std::os::unix::fs::symlink;
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "elsewhere/target_DCA-1.pdf", b"%PDF");
        write(root, "elsewhere/nested/b.txt", b"b");
        std::fs::create_dir(root.join("folder")).unwrap();
        symlink(root.join("elsewhere/target_DCA-1.pdf"), root.join("folder/link_DCA-1.pdf")).unwrap();
        symlink(root.join("elsewhere/nested"), root.join("folder/linked_dir")).unwrap();
        symlink(root.join("missing.pdf"), root.join("folder/dangling.pdf")).unwrap();

        let dir = LocalDirectory::new(root.join("folder")).unwrap();
        let entries: Vec<Entry> = children(&dir).try_collect().await.unwrap();
        let mut kinds: Vec<(String, bool)> = entries.iter().map(|e| (e.name().to_string(), e.is_directory())).collect();
        kinds.sort();
        assert_eq!(
            kinds,
            [
                ("dangling.pdf".to_string(), false),
                ("link_DCA-1.pdf".to_string(), false),
                ("linked_dir".to_string(), true),
            ]
        );

        for entry in &entries {
            match (entry, entry.name()) {
                (Entry::File(file), "link_DCA-1.pdf") => {
                    assert_eq!(file.stat().await.unwrap().size, 4);
                    assert_eq!(file.read().await.unwrap(), b"%PDF");
                },
                (Entry::File(file), "dangling.pdf") => {
                    assert!(matches!(&*file.stat().await.unwrap_err(), ErrorKind::NotFound(_)));
                },
                (Entry::Directory(linked), _) => {
                    let names: Vec<String> = children(linked.as_ref()).map_ok(|e| e.name().to_string()).try_collect().await.unwrap();
                    assert_eq!(names, ["b.txt"]);
                },
                _ => unreachable!(),
            }
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_link_back_to_parent_is_not_followed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = std::fs::canonicalize(temp_dir.path()).unwrap().join("folder");
        std::fs::create_dir_all(folder.join("sub")).unwrap();
        std::os::unix::fs::symlink(&folder, folder.join("sub/up")).unwrap();

        let dir = LocalDirectory::new(&folder).unwrap();
        let entries: Vec<Entry> = children(&dir).try_collect().await.unwrap();
        let [Entry::Directory(sub)] = entries.as_slice() else { panic!("expected only the sub directory") };
        let nested: Vec<Entry> = children(sub.as_ref()).try_collect().await.unwrap();
        let [Entry::File(up)] = nested.as_slice() else { panic!("expected the link as a file") };
        assert!(matches!(&*up.stat().await.unwrap_err(), ErrorKind::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_interrupted_batch_keeps_earlier_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "root/a.pdf", b"a");
        let dir = LocalDirectory::new(temp_dir.path().join("root")).unwrap();
        let read = || Entry::File(Arc::new(LocalFile::new(temp_dir.path().join("root/a.pdf")).unwrap()));
        let failure = || Exn::from(ErrorKind::Unreadable("root".to_string()));

        let mut reader = LocalReader { dir: &dir, entries: None, interrupted: None, finished: false };
        let batch = reader.interrupt(vec![read()], failure()).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(matches!(&*reader.read_batch().await.unwrap_err(), ErrorKind::Unreadable(_)));
        assert!(reader.read_batch().await.unwrap().is_empty());

        let mut reader = LocalReader { dir: &dir, entries: None, interrupted: None, finished: false };
        assert!(reader.interrupt(Vec::new(), failure()).is_err());
        assert!(reader.read_batch().await.unwrap().is_empty());
    }
}
