use crate::FileDescriptor;
use crate::matcher::{ProductCode, filter_files, parse_codes};
use derive_more::Display;
use filematch_classify::FileTypeFilter;

/// Why a match request was rejected before any matching happened.
///
/// These are ordinary values for the user to act on, not errors.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Nothing has been loaded yet.
    #[display("no files loaded")]
    NoFiles,
    /// The code text is blank.
    #[display("no product codes entered")]
    NoCodes,
    /// The code text only contains separators and whitespace.
    #[display("no valid product codes entered")]
    NoValidCodes,
    /// No loaded file passes the selected type filter.
    #[display("no loaded files of type {_0}")]
    NoFilesOfType(FileTypeFilter),
}

/// Check a match request and parse its codes.
///
/// Checks run in order: files present, code text present, code text parses
/// to at least one code, at least one file of the selected type.
///
/// # Examples
///
/// ```
/// use filematch_classify::FileTypeFilter;
/// use filematch_library::matcher::{ValidationFailure, validate_request};
///
/// assert_eq!(validate_request(&[], "DCA", FileTypeFilter::All), Err(ValidationFailure::NoFiles));
/// ```
pub fn validate_request(
    files: &[FileDescriptor],
    raw_codes: &str,
    filter: FileTypeFilter,
) -> Result<Vec<ProductCode>, ValidationFailure> {
    if files.is_empty() {
        return Err(ValidationFailure::NoFiles);
    }
    if raw_codes.trim().is_empty() {
        return Err(ValidationFailure::NoCodes);
    }
    let codes = parse_codes(raw_codes);
    if codes.is_empty() {
        return Err(ValidationFailure::NoValidCodes);
    }
    if filter_files(files, filter).is_empty() {
        return Err(ValidationFailure::NoFilesOfType(filter));
    }
    Ok(codes)
}
