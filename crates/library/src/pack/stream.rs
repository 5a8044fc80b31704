use crate::FileDescriptor;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::pack::error::{ErrorKind, Result as PackResult};
use crate::pack::{Archive, ArchiveOptions, Compression};
use crate::progress::percent;
use async_stream::stream;
use exn::ResultExt;
use filematch_entry::validate_path;
use futures::Stream;
use std::io::{Cursor, Write};
use time::{OffsetDateTime, UtcOffset};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

type Writer = ZipWriter<Cursor<Vec<u8>>>;

/// Progress events emitted by [`pack_stream`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`Added`](Self::Added): once per file, in input order.
/// 3. [`Finished`](Self::Finished): exactly once, with the archive.
///
/// An error terminates the stream early, in which case no archive is ever
/// produced.
#[derive(Debug)]
pub enum PackEvent {
    Started {
        total: usize,
    },
    /// A file has been written into the archive under `path`.
    Added {
        path: String,
        completed: usize,
        total: usize,
        /// `completed * 100 / total`: never decreases, and only reaches 100
        /// once the last file is in.
        percent: u8,
    },
    Finished(Archive),
}

/// Streams [`PackEvent`]s while packing `files` into an archive.
pub fn pack_stream<'a>(
    files: &'a [FileDescriptor],
    options: &'a ArchiveOptions,
) -> impl Stream<Item = LibraryResult<PackEvent>> + 'a {
    stream! {
        for await event in pack_inner(files, options) {
            yield event.or_raise(|| LibraryErrorKind::Pack);
        }
    }
}

fn pack_inner<'a>(
    files: &'a [FileDescriptor],
    options: &'a ArchiveOptions,
) -> impl Stream<Item = PackResult<PackEvent>> + 'a {
    stream!({
        let total = files.len();
        if total == 0 {
            yield Err(exn::Exn::from(ErrorKind::Empty));
            return;
        }
        yield Ok(PackEvent::Started { total });

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (index, file) in files.iter().enumerate() {
            let path = match add_file(&mut writer, file, options.compression).await {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(path = %file.path, "Aborting archive");
                    yield Err(e);
                    return;
                },
            };
            let completed = index + 1;
            yield Ok(PackEvent::Added { path, completed, total, percent: percent(completed, total) });
        }

        let bytes = match writer.finish().or_raise(|| ErrorKind::Archive) {
            Ok(cursor) => cursor.into_inner(),
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        tracing::info!(name = %options.name, files = total, bytes = bytes.len(), "Archive created");
        yield Ok(PackEvent::Finished(Archive { name: options.name.clone(), bytes }));
    })
}

/// Read one file and write it into the archive, returning its entry name.
async fn add_file(writer: &mut Writer, file: &FileDescriptor, compression: Compression) -> PackResult<String> {
    let path = validate_path(&file.path).or_raise(|| ErrorKind::InvalidPath(file.path.clone()))?;
    let bytes = file.read().await.or_raise(|| ErrorKind::Read(file.path.clone()))?;

    let mut options = SimpleFileOptions::default()
        .compression_method(compression.method())
        .large_file(bytes.len() as u64 >= u64::from(u32::MAX));
    if let Some(modified) = file.modified.and_then(zip_timestamp) {
        options = options.last_modified_time(modified);
    }
    writer.start_file(path.as_str(), options).or_raise(|| ErrorKind::Archive)?;
    writer.write_all(&bytes).or_raise(|| ErrorKind::Archive)?;
    tracing::debug!(path = %path, bytes = bytes.len(), "Added file to archive");
    Ok(path)
}

/// Zip timestamps only cover 1980-2107 (UTC); anything else keeps the default.
fn zip_timestamp(modified: OffsetDateTime) -> Option<zip::DateTime> {
    let utc = modified.to_offset(UtcOffset::UTC);
    let year = u16::try_from(utc.year()).ok()?;
    zip::DateTime::from_date_and_time(year, utc.month().into(), utc.day(), utc.hour(), utc.minute(), utc.second()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::tests::descriptor;
    use futures::StreamExt;
    use std::ops::Deref;

    #[tokio::test]
    async fn test_progress_monotonicity() {
        let files: Vec<_> = (0..7).map(|i| descriptor(&format!("dir/file-{i}.txt"))).collect();
        let options = ArchiveOptions::default();
        let events: Vec<_> = pack_stream(&files, &options).collect().await;
        assert!(matches!(events[0], Ok(PackEvent::Started { total: 7 })));

        let percents: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                Ok(PackEvent::Added { percent, .. }) => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents.len(), 7);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percents.iter().filter(|p| **p == 100).count(), 1);
        assert_eq!(percents.last(), Some(&100));
        assert!(matches!(events.last(), Some(Ok(PackEvent::Finished(_)))));
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let files = [descriptor("ok.txt"), descriptor("../escape.txt"), descriptor("never.txt")];
        let options = ArchiveOptions::default();
        let events: Vec<_> = pack_inner(&files, &options).collect().await;
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], Ok(PackEvent::Added { completed: 1, .. })));
        let err = events.into_iter().last().unwrap().unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::InvalidPath(path) if path == "../escape.txt"));
    }

    #[test]
    fn test_zip_timestamp() {
        use time::macros::datetime;
        let stamp = zip_timestamp(datetime!(2024-03-05 10:20:30 UTC)).unwrap();
        assert_eq!((stamp.year(), stamp.month(), stamp.day()), (2024, 3, 5));
        assert_eq!((stamp.hour(), stamp.minute(), stamp.second()), (10, 20, 30));
        assert!(zip_timestamp(datetime!(1970-01-01 00:00:00 UTC)).is_none());
    }

    #[tokio::test]
    async fn test_empty() {
        let options = ArchiveOptions::default();
        let events: Vec<_> = pack_inner(&[], &options).collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].as_ref().unwrap_err().deref(), ErrorKind::Empty));
    }
}
