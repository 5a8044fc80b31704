//! Directory entry walking.
//!
//! Turns the entries a user handed over (loose files and whole folders) into a
//! flat list of [`FileDescriptor`]s. Folders are walked recursively through
//! their batch readers; each folder's name becomes a path segment of
//! everything beneath it.
//!
//! Walking is forgiving: a file whose metadata can't be read, or a folder whose
//! enumeration breaks part-way, is skipped (and logged) while the rest of the
//! walk carries on. The result only ever degrades, it never fails.
//!
//! The primary entry point is [`walk_stream`], which reports progress as it
//! goes; [`walk`] simply drains it.

mod stream;
mod tree;

pub use self::stream::{WalkEvent, walk_stream};
use crate::FileDescriptor;
use filematch_entry::Entry;
use futures::StreamExt;
use std::collections::HashSet;

/// The result of a completed walk.
#[derive(Debug, Default)]
pub struct Walk {
    /// Every readable file, in input order (depth-first within a folder).
    pub files: Vec<FileDescriptor>,
    /// Paths of files and folders that had to be skipped.
    pub skipped: Vec<String>,
}

/// Walk every entry to completion and collect the discovered files.
///
/// # Examples
///
/// ```no_run
/// use filematch_entry::Entry;
/// use filematch_library::walk::walk;
///
/// # async fn example() -> filematch_entry::error::Result<()> {
/// let entries = vec![Entry::open("/tmp/folderA").await?, Entry::open("/tmp/x.pdf").await?];
/// let walked = walk(entries, 8).await;
/// println!("{} files, {} skipped", walked.files.len(), walked.skipped.len());
/// # Ok(())
/// # }
/// ```
pub async fn walk(entries: Vec<Entry>, concurrency: usize) -> Walk {
    let mut walked = Walk::default();
    let mut events = std::pin::pin!(walk_stream(entries, concurrency));
    while let Some(event) = events.next().await {
        match event {
            WalkEvent::Discovered(file) => walked.files.push(file),
            WalkEvent::Skipped { path } => walked.skipped.push(path),
            WalkEvent::Started { .. }
            | WalkEvent::EntryWalked { .. }
            | WalkEvent::Progress { .. }
            | WalkEvent::Complete { .. } => {},
        }
    }
    walked
}

/// Hands out unique paths.
///
/// The first file to claim a path keeps it; later ones get ` (2)`, ` (3)`,
/// and so on inserted before their extension.
#[derive(Debug, Default)]
pub(crate) struct PathClaims {
    taken: HashSet<String>,
}

impl PathClaims {
    pub(crate) fn claim(&mut self, path: &str) -> String {
        if self.taken.insert(path.to_string()) {
            return path.to_string();
        }
        let (dir, name) = match path.rsplit_once('/') {
            Some((dir, name)) => (Some(dir), name),
            None => (None, path),
        };
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };
        let mut counter = 2usize;
        loop {
            let renamed = match ext {
                Some(ext) => format!("{stem} ({counter}).{ext}"),
                None => format!("{stem} ({counter})"),
            };
            let candidate = filematch_entry::join_path(dir, &renamed);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
