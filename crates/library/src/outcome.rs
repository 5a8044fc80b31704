//! Structured results of session operations.
//!
//! Nothing here is an error in the Rust sense: every operation ends with an
//! [`Outcome`], and the presentation layer decides how to show it.

use crate::matcher::ValidationFailure;
use crate::messages::{Language, Message};
use crate::operation::OperationKind;
use crate::pack::Delivered;

/// How an outcome should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A load finished; `skipped` entries couldn't be read.
    Loaded { files: usize, skipped: usize },
    /// The request was rejected before anything ran.
    Invalid(ValidationFailure),
    /// Codes and files were present, but nothing matched.
    NoneMatched { searched: usize },
    /// At least one file matched; `unmatched` codes were found nowhere.
    Matched { matched: usize, unmatched: usize },
    /// A download was requested without any matched files.
    NothingToDownload,
    /// The archive was built and delivered.
    Downloaded { files: usize, delivered: Delivered },
    /// The archive could not be built. Nothing was delivered.
    PackagingFailed,
    /// The archive was built but could not be delivered.
    DeliveryFailed { name: String },
    /// The operation was already running; nothing was done.
    Busy(OperationKind),
}

impl Outcome {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Loaded { files: 0, .. } => Severity::Warning,
            Self::Loaded { skipped: 0, .. } => Severity::Success,
            Self::Loaded { .. } => Severity::Warning,
            Self::Invalid(_) | Self::NothingToDownload => Severity::Warning,
            Self::NoneMatched { .. } | Self::Busy(_) => Severity::Info,
            Self::Matched { unmatched: 0, .. } => Severity::Success,
            // Partial success.
            Self::Matched { .. } => Severity::Warning,
            Self::Downloaded { .. } => Severity::Success,
            Self::PackagingFailed | Self::DeliveryFailed { .. } => Severity::Error,
        }
    }

    /// Whether the user got what they asked for.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Loaded { .. } | Self::Matched { .. } | Self::Downloaded { .. })
    }

    /// Localized, user-facing text.
    pub fn message(&self, language: Language) -> String {
        let count = |n: usize| [("count", n.to_string())];
        match self {
            Self::Loaded { files, skipped: 0 } => Message::SuccessfullyLoadedFiles.format(language, &count(*files)),
            Self::Loaded { files, skipped } => sentences(
                language,
                Message::SuccessfullyLoadedFiles.format(language, &count(*files)),
                Message::SkippedEntries.format(language, &count(*skipped)),
            ),
            Self::Invalid(ValidationFailure::NoFiles) => Message::PleaseUploadFiles.template(language).to_string(),
            Self::Invalid(ValidationFailure::NoCodes) => Message::PleaseEnterCodes.template(language).to_string(),
            Self::Invalid(ValidationFailure::NoValidCodes) => {
                Message::PleaseEnterValidCodes.template(language).to_string()
            },
            Self::Invalid(ValidationFailure::NoFilesOfType(filter)) => {
                Message::NoFilesOfType.format(language, &[("type", filter.label().to_string())])
            },
            Self::NoneMatched { searched } => Message::NoFilesMatched.format(language, &count(*searched)),
            Self::Matched { matched, unmatched: 0 } => Message::FoundMatchingFiles.format(language, &count(*matched)),
            Self::Matched { matched, unmatched } => sentences(
                language,
                Message::FoundMatchingFiles.format(language, &count(*matched)),
                Message::CodesNotFound.format(language, &count(*unmatched)),
            ),
            Self::NothingToDownload => Message::NoMatchedFilesToDownload.template(language).to_string(),
            Self::Downloaded { files, .. } => Message::DownloadedFilesAsZip.format(language, &count(*files)),
            Self::PackagingFailed => Message::ErrorCreatingZip.template(language).to_string(),
            Self::DeliveryFailed { name } => Message::ErrorSavingZip.format(language, &[("name", name.clone())]),
            Self::Busy(kind) => {
                Message::AlreadyInProgress.format(language, &[("operation", kind.label(language).to_string())])
            },
        }
    }
}

fn sentences(language: Language, first: String, second: String) -> String {
    match language {
        Language::En => format!("{first}. {second}."),
        Language::Zh => format!("{first}。{second}。"),
    }
}
