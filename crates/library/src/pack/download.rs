use crate::pack::Archive;
use crate::pack::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Where a delivered archive ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivered {
    pub name: String,
    pub size: u64,
    /// Location on disk, for targets that write one.
    pub location: Option<PathBuf>,
}

/// Sink for finished archives; the equivalent of a browser download.
///
/// The archive is taken by value, so its buffer is released as soon as
/// delivery returns.
#[async_trait]
pub trait DownloadTarget: Send + Sync {
    async fn deliver(&self, archive: Archive) -> Result<Delivered>;
}

/// Writes archives into a directory, as `<directory>/<archive name>`.
///
/// An existing file with the same name is replaced.
#[derive(Clone, Debug)]
pub struct DirectoryTarget {
    directory: PathBuf,
}

impl DirectoryTarget {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl DownloadTarget for DirectoryTarget {
    async fn deliver(&self, archive: Archive) -> Result<Delivered> {
        if Path::new(&archive.name).file_name().is_none_or(|n| n != archive.name.as_str()) {
            exn::bail!(ErrorKind::InvalidName(archive.name));
        }
        let location = self.directory.join(&archive.name);
        let shown = location.display().to_string();
        tokio::fs::create_dir_all(&self.directory).await.or_raise(|| ErrorKind::Deliver(shown.clone()))?;
        tokio::fs::write(&location, &archive.bytes).await.or_raise(|| ErrorKind::Deliver(shown.clone()))?;
        tracing::info!(path = %shown, bytes = archive.len(), "Archive saved");
        Ok(Delivered {
            name: archive.name,
            size: archive.bytes.len() as u64,
            location: Some(location),
        })
    }
}

/// Keeps delivered archives in memory.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    archives: Mutex<Vec<Archive>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything delivered so far.
    pub async fn take(&self) -> Vec<Archive> {
        std::mem::take(&mut *self.archives.lock().await)
    }
}

#[async_trait]
impl DownloadTarget for MemoryTarget {
    async fn deliver(&self, archive: Archive) -> Result<Delivered> {
        let delivered = Delivered {
            name: archive.name.clone(),
            size: archive.bytes.len() as u64,
            location: None,
        };
        self.archives.lock().await.push(archive);
        Ok(delivered)
    }
}
