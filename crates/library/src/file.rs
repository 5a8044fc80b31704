use filematch_classify::classify;
use filematch_entry::FileHandle;
use filematch_entry::error::Result as EntryResult;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use time::OffsetDateTime;

/// A discovered file.
///
/// The `path` is the slash-separated path relative to whatever the user
/// handed over, including the names of dropped folders (`folderA/sub/a.pdf`),
/// and is unique within a single walk. The `name` is only the last component
/// and may repeat.
#[derive(Clone)]
pub struct FileDescriptor {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub modified: Option<OffsetDateTime>,
    /// Byte source. Ignored by equality and [`Debug`].
    pub handle: FileHandle,
}

impl FileDescriptor {
    /// Materialize a descriptor for a leaf entry that will live at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the entry's metadata cannot be read.
    pub async fn describe(handle: FileHandle, path: String) -> EntryResult<Self> {
        let stat = handle.stat().await?;
        let name = handle.name().to_string();
        let mime_type = classify(&name, stat.reported_type.as_deref());
        Ok(Self {
            path,
            name,
            size: stat.size,
            mime_type,
            modified: stat.modified,
            handle,
        })
    }

    /// Read the file's full contents.
    pub async fn read(&self) -> EntryResult<Vec<u8>> {
        self.handle.read().await
    }
}

impl PartialEq for FileDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.name == other.name
            && self.size == other.size
            && self.mime_type == other.mime_type
            && self.modified == other.modified
    }
}
impl Eq for FileDescriptor {}

impl Debug for FileDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FileDescriptor")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}
