use crate::FileDescriptor;
use crate::walk::PathClaims;
use crate::walk::tree::{Subtree, Tally, walk_tree};
use async_stream::stream;
use filematch_entry::Entry;
use futures::{Stream, StreamExt};

/// Progress events emitted by [`walk_stream`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once, with the number of top-level
///    entries.
/// 2. For each top-level entry, in input order: zero or more
///    [`Discovered`](Self::Discovered) and [`Skipped`](Self::Skipped) events,
///    then one [`EntryWalked`](Self::EntryWalked).
/// 3. [`Complete`](Self::Complete): exactly once, after every entry has been
///    fully walked.
///
/// [`Progress`](Self::Progress) events may show up anywhere between
/// `Started` and `Complete`.
#[derive(Debug)]
pub enum WalkEvent {
    /// Walking has begun.
    Started { entries: usize },
    /// A readable file was found. Its path is unique within this walk.
    Discovered(FileDescriptor),
    /// A file or directory couldn't be read and was left out.
    Skipped { path: String },
    /// One more top-level entry has been walked to completion.
    EntryWalked { completed: usize, total: usize },
    /// `resolved` of the `found` entries (at any depth) have been walked.
    /// `found` grows as folders are listed.
    Progress { resolved: usize, found: usize },
    /// Every entry has been walked.
    Complete { files: usize, skipped: usize },
}

/// Streams [`WalkEvent`]s while walking `entries`.
///
/// Up to `concurrency` top-level entries are walked at the same time (at
/// least one). Results are re-joined in input order, so the discovered files
/// come out in the same order no matter how the work interleaves.
pub fn walk_stream(entries: Vec<Entry>, concurrency: usize) -> impl Stream<Item = WalkEvent> {
    let total = entries.len();
    let concurrency = concurrency.max(1);
    stream!({
        yield WalkEvent::Started { entries: total };
        tracing::debug!(entries = total, concurrency, "Walking entries");

        let mut claims = PathClaims::default();
        let (mut files, mut skipped) = (0usize, 0usize);
        let tally = Tally::new(total);
        let mut tallies = tally.subscribe();
        let mut subtrees = futures::stream::iter(entries).map(|entry| walk_tree(entry, &tally)).buffered(concurrency);
        let mut completed = 0usize;
        loop {
            let step = tokio::select! {
                biased;
                Ok(()) = tallies.changed() => {
                    let (resolved, found) = *tallies.borrow_and_update();
                    Step::Tallied { resolved, found }
                },
                subtree = subtrees.next() => match subtree {
                    Some(subtree) => Step::Walked(subtree),
                    None => Step::Done,
                },
            };
            let subtree = match step {
                Step::Walked(subtree) => subtree,
                Step::Tallied { resolved, found } => {
                    yield WalkEvent::Progress { resolved, found };
                    continue;
                },
                Step::Done => break,
            };
            for mut file in subtree.files {
                let path = claims.claim(&file.path);
                if path != file.path {
                    tracing::debug!(from = %file.path, to = %path, "Renamed duplicate path");
                    file.path = path;
                }
                files += 1;
                yield WalkEvent::Discovered(file);
            }
            for path in subtree.skipped {
                skipped += 1;
                yield WalkEvent::Skipped { path };
            }
            completed += 1;
            yield WalkEvent::EntryWalked { completed, total };
        }

        tracing::info!(files, skipped, "Walk complete");
        yield WalkEvent::Complete { files, skipped };
    })
}

enum Step {
    Walked(Subtree),
    Tallied { resolved: usize, found: usize },
    Done,
}
