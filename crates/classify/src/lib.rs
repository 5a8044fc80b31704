//! File type classification.
//!
//! Derives a MIME type from a file name when the source of the file didn't
//! report one, and provides the [`FileTypeFilter`] categories used to narrow
//! a set of files down before matching:
//!
//! - **Classification** via a static extension table for the document and
//!   image formats the matcher cares about, falling back to [`mime_guess`]
//!   for everything else ([`classify`])
//! - **Extension extraction** with the same "text after the last dot" rule
//!   everywhere ([`extension`])
//! - **Filtering** by category ([`FileTypeFilter::allows`])

pub mod error;
mod filter;

pub use crate::filter::FileTypeFilter;

/// The generic "unknown binary" type.
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

const MIME_TYPES: [(&str, &str); 12] = [
    ("pdf", "application/pdf"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("xls", "application/vnd.ms-excel"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("doc", "application/msword"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
];

/// Lowercased extension of a file name: the text after the last `.`.
///
/// Names without a `.` (or ending in one) have no extension.
///
/// # Examples
///
/// ```
/// use filematch_classify::extension;
/// assert_eq!(extension("Report.Final.PDF").as_deref(), Some("pdf"));
/// assert_eq!(extension("README"), None);
/// assert_eq!(extension("archive."), None);
/// ```
#[must_use]
pub fn extension(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

/// Look up the MIME type for a (lowercased) extension.
#[must_use]
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .or_else(|| mime_guess::from_ext(ext).first_raw())
}

/// Best-known MIME type for a file.
///
/// A non-empty `reported` type always wins. Otherwise the type is derived
/// from the file name's extension, or [`UNKNOWN_MIME_TYPE`] if the extension
/// is missing or unknown. Never fails.
///
/// # Examples
///
/// ```
/// use filematch_classify::classify;
/// assert_eq!(classify("scan.JPG", None), "image/jpeg");
/// assert_eq!(classify("scan.jpg", Some("image/x-custom")), "image/x-custom");
/// assert_eq!(classify("scan.jpg", Some("")), "image/jpeg");
/// assert_eq!(classify("no-extension", None), "application/octet-stream");
/// ```
#[must_use]
pub fn classify(name: &str, reported: Option<&str>) -> String {
    if let Some(reported) = reported.filter(|r| !r.is_empty()) {
        return reported.to_string();
    }
    extension(name)
        .and_then(|ext| mime_for_extension(&ext))
        .unwrap_or(UNKNOWN_MIME_TYPE)
        .to_string()
}
