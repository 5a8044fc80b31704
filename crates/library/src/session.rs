use crate::matcher::{MatchStatus, Matches, ValidationFailure, match_files, validate_request};
use crate::operation::{Operation, OperationKind, OperationState};
use crate::outcome::Outcome;
use crate::pack::{ArchiveOptions, DownloadTarget, pack};
use crate::progress::{Phase, ProgressReporter};
use crate::walk::{WalkEvent, walk_stream};
use crate::{DEFAULT_WALK_CONCURRENCY, FileDescriptor};
use filematch_classify::FileTypeFilter;
use filematch_entry::Entry;
use futures::StreamExt;
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// How many top-level entries are walked at the same time.
    pub walk_concurrency: usize,
    pub archive: ArchiveOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            walk_concurrency: DEFAULT_WALK_CONCURRENCY,
            archive: ArchiveOptions::default(),
        }
    }
}

/// Everything one user works with: the loaded files, the last match result,
/// and the progress of file processing and archive creation.
///
/// Each operation ([`load`](Self::load), [`match_codes`](Self::match_codes),
/// [`download`](Self::download)) can only run once at a time; calling it
/// again while it is still running returns [`Outcome::Busy`].
///
/// # Examples
///
/// ```no_run
/// use filematch_classify::FileTypeFilter;
/// use filematch_entry::Entry;
/// use filematch_library::Session;
/// use filematch_library::messages::Language;
/// use filematch_library::pack::DirectoryTarget;
///
/// # async fn example() -> filematch_entry::error::Result<()> {
/// let session = Session::default();
/// session.load(vec![Entry::open("/tmp/folderA").await?]).await;
/// session.match_codes("DCA-4901, DCB", FileTypeFilter::Pdf).await;
/// let outcome = session.download(&DirectoryTarget::new("/tmp")).await;
/// println!("{}", outcome.message(Language::En));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    options: SessionOptions,
    files: RwLock<Vec<FileDescriptor>>,
    matches: RwLock<Option<Matches>>,
    processing: ProgressReporter,
    zipping: ProgressReporter,
    loading: Operation,
    matching: Operation,
    downloading: Operation,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            files: RwLock::new(Vec::new()),
            matches: RwLock::new(None),
            processing: ProgressReporter::new(),
            zipping: ProgressReporter::new(),
            loading: Operation::new(OperationKind::Load),
            matching: Operation::new(OperationKind::Match),
            downloading: Operation::new(OperationKind::Download),
        }
    }

    /// Progress of walking entries during [`load`](Self::load).
    pub fn processing_progress(&self) -> &ProgressReporter {
        &self.processing
    }

    /// Progress of building the archive during [`download`](Self::download).
    pub fn zip_progress(&self) -> &ProgressReporter {
        &self.zipping
    }

    pub fn state(&self, kind: OperationKind) -> OperationState {
        self.operation(kind).state()
    }

    fn operation(&self, kind: OperationKind) -> &Operation {
        match kind {
            OperationKind::Load => &self.loading,
            OperationKind::Match => &self.matching,
            OperationKind::Download => &self.downloading,
        }
    }

    /// The currently loaded files.
    pub async fn files(&self) -> Vec<FileDescriptor> {
        self.files.read().await.clone()
    }

    /// The result of the last successful match, if any.
    pub async fn matches(&self) -> Option<Matches> {
        self.matches.read().await.clone()
    }

    /// Walk `entries` and make the result the loaded file set, replacing
    /// whatever was loaded before (and forgetting the previous match).
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub async fn load(&self, entries: Vec<Entry>) -> Outcome {
        let Some(guard) = self.loading.start() else {
            return Outcome::Busy(OperationKind::Load);
        };
        self.processing.begin(Phase::ProcessingFiles);
        let mut files = Vec::new();
        let mut skipped = 0usize;
        let mut events = std::pin::pin!(walk_stream(entries, self.options.walk_concurrency));
        while let Some(event) = events.next().await {
            match event {
                WalkEvent::Discovered(file) => files.push(file),
                WalkEvent::Skipped { .. } => skipped += 1,
                WalkEvent::Progress { resolved, found } => self.processing.advance(resolved, found),
                WalkEvent::Started { .. } | WalkEvent::EntryWalked { .. } | WalkEvent::Complete { .. } => {},
            }
        }
        self.processing.finish();

        let loaded = files.len();
        *self.files.write().await = files;
        *self.matches.write().await = None;
        guard.succeed();
        Outcome::Loaded { files: loaded, skipped }
    }

    /// Match `raw_codes` against the loaded files of type `filter`.
    ///
    /// A rejected request leaves the previous match result in place.
    #[instrument(skip(self, raw_codes))]
    pub async fn match_codes(&self, raw_codes: &str, filter: FileTypeFilter) -> Outcome {
        let Some(guard) = self.matching.start() else {
            return Outcome::Busy(OperationKind::Match);
        };
        let files = self.files.read().await;
        let codes = match validate_request(&files, raw_codes, filter) {
            Ok(codes) => codes,
            Err(failure) => {
                tracing::debug!(%failure, "Rejected match request");
                guard.fail();
                return Outcome::Invalid(failure);
            },
        };
        let matches = match_files(&files, &codes, filter);
        drop(files);

        let outcome = match matches.status() {
            MatchStatus::Matched => Outcome::Matched {
                matched: matches.matched.len(),
                unmatched: matches.unmatched.len(),
            },
            MatchStatus::NoneMatched => Outcome::NoneMatched { searched: matches.searched },
            // Validation guarantees at least one code.
            MatchStatus::NoCodes => Outcome::Invalid(ValidationFailure::NoValidCodes),
        };
        *self.matches.write().await = Some(matches);
        guard.succeed();
        outcome
    }

    /// Pack the matched files and hand the archive to `target`.
    #[instrument(skip_all)]
    pub async fn download(&self, target: &dyn DownloadTarget) -> Outcome {
        let Some(guard) = self.downloading.start() else {
            return Outcome::Busy(OperationKind::Download);
        };
        let files = match self.matches.read().await.as_ref() {
            Some(matches) if !matches.matched.is_empty() => matches.files(),
            _ => {
                guard.fail();
                return Outcome::NothingToDownload;
            },
        };

        let archive = match pack(&files, &self.options.archive, &self.zipping).await {
            Ok(archive) => archive,
            Err(e) => {
                tracing::error!(error = ?e, "Could not create archive");
                guard.fail();
                return Outcome::PackagingFailed;
            },
        };
        let name = archive.name.clone();
        match target.deliver(archive).await {
            Ok(delivered) => {
                guard.succeed();
                Outcome::Downloaded { files: files.len(), delivered }
            },
            Err(e) => {
                tracing::error!(error = ?e, "Could not deliver archive");
                guard.fail();
                Outcome::DeliveryFailed { name }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Language;
    use crate::pack::{Archive, DirectoryTarget, MemoryTarget};
    use crate::progress::Progress;
    use async_trait::async_trait;
    use filematch_entry::{FileEntry, FileStat, MockDirectory, MockFile};
    use std::io::Cursor;
    use std::sync::Arc;
    use tokio::sync::Notify;
    use zip::ZipArchive;

    /// A file whose contents can only be read once `gate` is opened.
    struct GatedFile {
        name: String,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl FileEntry for GatedFile {
        fn name(&self) -> &str {
            &self.name
        }

        async fn stat(&self) -> filematch_entry::error::Result<FileStat> {
            Ok(FileStat { size: 1, ..FileStat::default() })
        }

        async fn read(&self) -> filematch_entry::error::Result<Vec<u8>> {
            self.gate.notified().await;
            Ok(b"x".to_vec())
        }
    }

    fn file(name: &str) -> Entry {
        MockFile::new(name, format!("contents of {name}")).into_entry()
    }

    fn archive_names(archive: &Archive) -> Vec<String> {
        let zip = ZipArchive::new(Cursor::new(archive.bytes.clone())).unwrap();
        zip.file_names().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let session = Session::default();
        let entries = vec![
            MockDirectory::new("folderA", [file("a.pdf"), MockDirectory::new("sub", [file("report.pdf")]).into_entry()])
                .into_entry(),
            file("x.pdf"),
        ];
        assert_eq!(session.load(entries).await, Outcome::Loaded { files: 3, skipped: 0 });
        assert_eq!(session.match_codes("report", FileTypeFilter::All).await, Outcome::Matched { matched: 1, unmatched: 0 });

        let target = MemoryTarget::new();
        let outcome = session.download(&target).await;
        assert!(matches!(outcome, Outcome::Downloaded { files: 1, .. }));
        assert_eq!(outcome.message(Language::En), "Downloaded 1 files as ZIP");

        let archives = target.take().await;
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].name, "matched_files.zip");
        assert_eq!(archive_names(&archives[0]), ["folderA/sub/report.pdf"]);
        assert_eq!(session.state(OperationKind::Download), OperationState::Succeeded);
        assert_eq!(session.zip_progress().current(), Progress::default());
    }

    #[tokio::test]
    async fn test_product_codes_across_types() {
        let session = Session::default();
        let entries = vec![file("Invoice_DCA-4901.pdf"), file("Photo_DCA-493.png"), file("Spec_DCA-999.docx")];
        assert_eq!(session.load(entries).await, Outcome::Loaded { files: 3, skipped: 0 });
        assert_eq!(
            session.match_codes("DCA-4901, DCA-493\nDCA-500", FileTypeFilter::All).await,
            Outcome::Matched { matched: 2, unmatched: 1 }
        );

        let matches = session.matches().await.unwrap();
        let found: Vec<(&str, Vec<&str>)> = matches
            .matched
            .iter()
            .map(|m| (m.file.path.as_str(), m.matched_codes.iter().map(|code| code.as_str()).collect()))
            .collect();
        assert_eq!(
            found,
            [("Invoice_DCA-4901.pdf", vec!["DCA-4901"]), ("Photo_DCA-493.png", vec!["DCA-493"])]
        );
        let unmatched: Vec<&str> = matches.unmatched.iter().map(|code| code.as_str()).collect();
        assert_eq!(unmatched, ["DCA-500"]);

        let target = MemoryTarget::new();
        assert!(matches!(session.download(&target).await, Outcome::Downloaded { files: 2, .. }));
        let archives = target.take().await;
        assert_eq!(archives.len(), 1);
        assert_eq!(archive_names(&archives[0]), ["Invoice_DCA-4901.pdf", "Photo_DCA-493.png"]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let session = Session::default();
        assert_eq!(session.load(Vec::new()).await, Outcome::Loaded { files: 0, skipped: 0 });
        assert!(session.files().await.is_empty());
        assert_eq!(session.match_codes("DCA", FileTypeFilter::All).await, Outcome::Invalid(ValidationFailure::NoFiles));
        assert_eq!(session.download(&MemoryTarget::new()).await, Outcome::NothingToDownload);
    }

    #[tokio::test]
    async fn test_no_match() {
        let session = Session::default();
        session.load(vec![file("x.pdf")]).await;
        let outcome = session.match_codes("ZZZ", FileTypeFilter::All).await;
        assert_eq!(outcome, Outcome::NoneMatched { searched: 1 });
        assert!(outcome.message(Language::En).contains("Searched in 1 files"));

        let matches = session.matches().await.unwrap();
        assert!(matches.matched.is_empty());
        let unmatched: Vec<&str> = matches.unmatched.iter().map(|c| c.as_str()).collect();
        assert_eq!(unmatched, ["ZZZ"]);
        assert_eq!(session.download(&MemoryTarget::new()).await, Outcome::NothingToDownload);
    }

    #[tokio::test]
    async fn test_validation() {
        let session = Session::default();
        session.load(vec![file("a.pdf")]).await;
        assert_eq!(session.match_codes("   ", FileTypeFilter::All).await, Outcome::Invalid(ValidationFailure::NoCodes));
        assert_eq!(session.match_codes(", ,", FileTypeFilter::All).await, Outcome::Invalid(ValidationFailure::NoValidCodes));
        assert_eq!(
            session.match_codes("a", FileTypeFilter::Word).await,
            Outcome::Invalid(ValidationFailure::NoFilesOfType(FileTypeFilter::Word))
        );
        assert_eq!(session.state(OperationKind::Match), OperationState::Failed);
    }

    #[tokio::test]
    async fn test_reload_replaces_files_and_matches() {
        let session = Session::default();
        session.load(vec![file("DCA-1.pdf"), file("DCA-2.pdf")]).await;
        session.match_codes("DCA", FileTypeFilter::All).await;
        assert!(session.matches().await.is_some());

        session.load(vec![file("other.txt")]).await;
        let paths: Vec<String> = session.files().await.into_iter().map(|f| f.path).collect();
        assert_eq!(paths, ["other.txt"]);
        assert!(session.matches().await.is_none());
    }

    #[tokio::test]
    async fn test_packaging_failure() {
        let session = Session::default();
        session
            .load(vec![file("DCA-1.pdf"), MockFile::new("DCA-2.pdf", "x").unreadable_content().into_entry()])
            .await;
        assert_eq!(session.match_codes("dca", FileTypeFilter::Pdf).await, Outcome::Matched { matched: 2, unmatched: 0 });

        let target = MemoryTarget::new();
        assert_eq!(session.download(&target).await, Outcome::PackagingFailed);
        assert!(target.take().await.is_empty());
        assert_eq!(session.state(OperationKind::Download), OperationState::Failed);
        assert_eq!(session.zip_progress().current(), Progress::default());
    }

    #[tokio::test]
    async fn test_download_to_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let options = SessionOptions {
            archive: ArchiveOptions { name: "codes.zip".to_string(), ..ArchiveOptions::default() },
            ..SessionOptions::default()
        };
        let session = Session::new(options);
        session.load(vec![file("DCA-1.pdf")]).await;
        session.match_codes("DCA", FileTypeFilter::All).await;
        let outcome = session.download(&DirectoryTarget::new(temp_dir.path())).await;
        let Outcome::Downloaded { delivered, .. } = outcome else { panic!("expected a download, got {outcome:?}") };
        assert_eq!(delivered.location.as_deref(), Some(temp_dir.path().join("codes.zip").as_path()));
        assert!(temp_dir.path().join("codes.zip").exists());
    }

    #[tokio::test]
    async fn test_busy() {
        let session = Session::default();
        let guard = session.loading.start().unwrap();
        assert_eq!(session.load(vec![file("a.pdf")]).await, Outcome::Busy(OperationKind::Load));
        assert!(session.files().await.is_empty());
        guard.succeed();
        assert_eq!(session.load(vec![file("a.pdf")]).await, Outcome::Loaded { files: 1, skipped: 0 });
    }

    #[tokio::test]
    async fn test_load_during_download_leaves_zip_progress_alone() {
        let gate = Arc::new(Notify::new());
        let gated = Entry::File(Arc::new(GatedFile { name: "DCA-2.pdf".to_string(), gate: gate.clone() }));
        let session = Session::default();
        session.load(vec![file("DCA-1.pdf"), gated]).await;
        session.match_codes("DCA", FileTypeFilter::All).await;

        let mut zip_progress = session.zip_progress().subscribe();
        let target = MemoryTarget::new();
        let reload = async {
            // The first file is in, the second is waiting on the gate.
            zip_progress.wait_for(|progress| progress.percent == 50).await.unwrap();
            let loaded = session.load(vec![file("other.pdf")]).await;
            let during = session.zip_progress().current();
            gate.notify_one();
            (loaded, during)
        };
        let (outcome, (loaded, during)) = tokio::join!(session.download(&target), reload);

        assert_eq!(loaded, Outcome::Loaded { files: 1, skipped: 0 });
        assert_eq!(during, Progress { phase: Phase::CreatingZip, percent: 50 });
        assert!(matches!(outcome, Outcome::Downloaded { files: 2, .. }));
        assert_eq!(session.zip_progress().current(), Progress::default());
        assert_eq!(session.processing_progress().current(), Progress::default());
    }
}
