use crate::FileDescriptor;
use filematch_entry::{Entry, children, join_path};
use futures::StreamExt;
use futures::future::BoxFuture;
use tokio::sync::watch;

/// Everything found beneath one top-level entry.
#[derive(Debug, Default)]
pub(crate) struct Subtree {
    pub(crate) files: Vec<FileDescriptor>,
    pub(crate) skipped: Vec<String>,
}

/// Running count of entries, at any depth, as `(resolved, found)`.
///
/// A folder's children are only found once it has been listed, so `found`
/// keeps growing while the walk goes deeper.
#[derive(Debug)]
pub(crate) struct Tally {
    sender: watch::Sender<(usize, usize)>,
}

impl Tally {
    pub(crate) fn new(found: usize) -> Self {
        Self { sender: watch::Sender::new((0, found)) }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<(usize, usize)> {
        self.sender.subscribe()
    }

    fn found(&self, count: usize) {
        if count > 0 {
            self.sender.send_modify(|(_, found)| *found += count);
        }
    }

    fn resolved(&self) {
        self.sender.send_modify(|(resolved, _)| *resolved += 1);
    }
}

/// Walk a single top-level entry (and, for folders, everything under it).
pub(crate) async fn walk_tree(entry: Entry, tally: &Tally) -> Subtree {
    let mut subtree = Subtree::default();
    walk_entry(&entry, None, &mut subtree, tally).await;
    subtree
}

// Boxed, because an async fn can't recurse into itself directly.
fn walk_entry<'a>(
    entry: &'a Entry,
    parent: Option<&'a str>,
    subtree: &'a mut Subtree,
    tally: &'a Tally,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        let path = join_path(parent, entry.name());
        match entry {
            Entry::File(handle) => match FileDescriptor::describe(handle.clone(), path.clone()).await {
                Ok(file) => subtree.files.push(file),
                Err(e) => {
                    tracing::warn!(path = %path, error = ?e, "Skipping file that could not be read");
                    subtree.skipped.push(path.clone());
                },
            },
            Entry::Directory(dir) => {
                let mut listed = Vec::new();
                let mut entries = children(dir.as_ref());
                while let Some(child) = entries.next().await {
                    match child {
                        Ok(child) => listed.push(child),
                        Err(e) => {
                            // Whatever was enumerated before the failure is kept.
                            tracing::warn!(path = %path, error = ?e, "Skipping rest of directory that could not be read");
                            subtree.skipped.push(path.clone());
                            break;
                        },
                    }
                }
                drop(entries);
                tally.found(listed.len());
                for child in &listed {
                    walk_entry(child, Some(&path), subtree, tally).await;
                }
            },
        }
        tally.resolved();
    })
}
