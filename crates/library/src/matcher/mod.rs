//! Product code matching.
//!
//! Matching is a pure function of the loaded files, the codes and the file
//! type filter:
//!
//! 1. Files are narrowed down by [`FileTypeFilter`] first.
//! 2. Each remaining file keeps every code that appears in its *name*
//!    (case-insensitively, anywhere in the name, folders don't count).
//! 3. Files without any code are dropped.
//! 4. Codes that ended up in no file are reported as unmatched.
//!
//! One file may satisfy several codes and one code may be satisfied by several
//! files; there is no notion of a "best" match.

mod codes;
mod validate;

pub use self::codes::{ProductCode, parse_codes};
pub use self::validate::{ValidationFailure, validate_request};
use crate::FileDescriptor;
use filematch_classify::FileTypeFilter;
use std::collections::HashSet;

/// A file together with the codes found in its name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedFile {
    pub file: FileDescriptor,
    /// Codes present in the file name, in input order. Never empty for a
    /// file that is part of [`Matches`].
    pub matched_codes: Vec<ProductCode>,
}

impl MatchedFile {
    pub fn matched(&self) -> bool {
        !self.matched_codes.is_empty()
    }
}

/// How a matching run turned out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    /// There was nothing to look for.
    NoCodes,
    /// Codes were given, but no file name contained any of them.
    NoneMatched,
    /// At least one file matched.
    Matched,
}

/// The result of [`match_files`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Matches {
    /// Files containing at least one code, in input order.
    pub matched: Vec<MatchedFile>,
    /// Codes found in no file, in input order.
    pub unmatched: Vec<ProductCode>,
    /// Number of files that survived the type filter and were searched.
    pub searched: usize,
    /// Number of codes looked for.
    pub codes: usize,
}

impl Matches {
    pub fn status(&self) -> MatchStatus {
        if self.codes == 0 {
            MatchStatus::NoCodes
        } else if self.matched.is_empty() {
            MatchStatus::NoneMatched
        } else {
            MatchStatus::Matched
        }
    }

    /// The matched files' descriptors, in order.
    pub fn files(&self) -> Vec<FileDescriptor> {
        self.matched.iter().map(|m| m.file.clone()).collect()
    }
}

/// Files that pass `filter`, in input order.
pub fn filter_files(files: &[FileDescriptor], filter: FileTypeFilter) -> Vec<&FileDescriptor> {
    files.iter().filter(|file| filter.allows(&file.name)).collect()
}

/// Match `codes` against the names of the `files` that pass `filter`.
///
/// Total and deterministic: any input, including no files or no codes,
/// produces a result.
///
/// # Examples
///
/// ```no_run
/// use filematch_classify::FileTypeFilter;
/// use filematch_library::FileDescriptor;
/// use filematch_library::matcher::{match_files, parse_codes};
///
/// fn report(files: &[FileDescriptor]) {
///     let matches = match_files(files, &parse_codes("DCA,DCB"), FileTypeFilter::Pdf);
///     for m in &matches.matched {
///         println!("{} ({})", m.file.path, m.matched_codes.len());
///     }
/// }
/// ```
pub fn match_files(files: &[FileDescriptor], codes: &[ProductCode], filter: FileTypeFilter) -> Matches {
    let candidates = filter_files(files, filter);
    let searched = candidates.len();

    let mut found: HashSet<&ProductCode> = HashSet::new();
    let matched: Vec<MatchedFile> = candidates
        .into_iter()
        .filter_map(|file| {
            let folded = file.name.to_lowercase();
            let matched_codes: Vec<ProductCode> = codes.iter().filter(|c| c.is_in_folded(&folded)).cloned().collect();
            if matched_codes.is_empty() {
                return None;
            }
            Some(MatchedFile { file: file.clone(), matched_codes })
        })
        .collect();
    for m in &matched {
        found.extend(m.matched_codes.iter());
    }
    let unmatched = codes.iter().filter(|c| !found.contains(c)).cloned().collect();

    tracing::debug!(searched, codes = codes.len(), matched = matched.len(), "Matched product codes");
    Matches {
        matched,
        unmatched,
        searched,
        codes: codes.len(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use filematch_entry::{FileHandle, MockFile};
    use std::sync::Arc;

    pub(crate) fn descriptor(path: &str) -> FileDescriptor {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let handle: FileHandle = Arc::new(MockFile::new(name.clone(), path.as_bytes().to_vec()));
        FileDescriptor {
            path: path.to_string(),
            mime_type: filematch_classify::classify(&name, None),
            name,
            size: path.len() as u64,
            modified: None,
            handle,
        }
    }

    fn codes(list: &[&str]) -> Vec<ProductCode> {
        list.iter().filter_map(|c| ProductCode::new(c)).collect()
    }

    fn matched_paths(matches: &Matches) -> Vec<&str> {
        matches.matched.iter().map(|m| m.file.path.as_str()).collect()
    }

    fn unmatched(matches: &Matches) -> Vec<&str> {
        matches.unmatched.iter().map(ProductCode::as_str).collect()
    }

    #[test]
    fn test_case_insensitive() {
        let files = [descriptor("Invoice_DCA-4901.pdf")];
        let matches = match_files(&files, &codes(&["dca"]), FileTypeFilter::All);
        assert_eq!(matched_paths(&matches), ["Invoice_DCA-4901.pdf"]);
        assert_eq!(matches.matched[0].matched_codes, codes(&["dca"]));
        assert!(matches.unmatched.is_empty());
        assert_eq!(matches.status(), MatchStatus::Matched);
    }

    #[test]
    fn test_totality() {
        let empty = match_files(&[], &[], FileTypeFilter::All);
        assert!(empty.matched.is_empty());
        assert!(empty.unmatched.is_empty());
        assert_eq!(empty.searched, 0);
        assert_eq!(empty.status(), MatchStatus::NoCodes);

        let no_files = match_files(&[], &codes(&["A", "B"]), FileTypeFilter::Pdf);
        assert!(no_files.matched.is_empty());
        assert_eq!(unmatched(&no_files), ["A", "B"]);
        assert_eq!(no_files.status(), MatchStatus::NoneMatched);

        let no_codes = match_files(&[descriptor("a.pdf")], &[], FileTypeFilter::All);
        assert!(no_codes.matched.is_empty());
        assert_eq!(no_codes.searched, 1);
        assert_eq!(no_codes.status(), MatchStatus::NoCodes);
    }

    #[test]
    fn test_type_filter_precedence() {
        let files = [descriptor("DCA.png"), descriptor("DCA.pdf")];
        let matches = match_files(&files, &codes(&["DCA"]), FileTypeFilter::Pdf);
        assert_eq!(matched_paths(&matches), ["DCA.pdf"]);
        assert_eq!(matches.searched, 1);

        // A code only present in excluded files is unmatched.
        let matches = match_files(&files[..1], &codes(&["DCA"]), FileTypeFilter::Pdf);
        assert!(matches.matched.is_empty());
        assert_eq!(unmatched(&matches), ["DCA"]);
        assert_eq!(matches.searched, 0);

        // Matched through the kept .pdf, so not unmatched.
        let files = [descriptor("a-DCA1.pdf"), descriptor("a-DCA1.png")];
        let matches = match_files(&files, &codes(&["DCA1"]), FileTypeFilter::Pdf);
        assert_eq!(matched_paths(&matches), ["a-DCA1.pdf"]);
        assert_eq!(matches.matched[0].matched_codes, codes(&["DCA1"]));
        assert!(!unmatched(&matches).contains(&"DCA1"));
        assert!(matches.unmatched.is_empty());
    }

    #[test]
    fn test_overlapping_codes() {
        let files = [descriptor("DCA-4901_DCB-1.pdf"), descriptor("dca-4901-rev2.pdf"), descriptor("other.pdf")];
        let matches = match_files(&files, &codes(&["DCA-4901", "DCB", "DCA", "ZZZ"]), FileTypeFilter::All);
        assert_eq!(matched_paths(&matches), ["DCA-4901_DCB-1.pdf", "dca-4901-rev2.pdf"]);
        assert_eq!(matches.matched[0].matched_codes, codes(&["DCA-4901", "DCB", "DCA"]));
        assert_eq!(matches.matched[1].matched_codes, codes(&["DCA-4901", "DCA"]));
        assert_eq!(unmatched(&matches), ["ZZZ"]);
        assert!(matches.matched.iter().all(MatchedFile::matched));
    }

    #[test]
    fn test_codes_only_match_names() {
        let files = [descriptor("DCA-folder/readme.txt")];
        let matches = match_files(&files, &codes(&["DCA"]), FileTypeFilter::All);
        assert!(matches.matched.is_empty());
        assert_eq!(matches.status(), MatchStatus::NoneMatched);
    }

    #[test]
    fn test_duplicate_codes() {
        let files = [descriptor("A-1.pdf")];
        let matches = match_files(&files, &codes(&["A", "A", "B", "B"]), FileTypeFilter::All);
        assert_eq!(matches.matched[0].matched_codes, codes(&["A", "A"]));
        assert_eq!(unmatched(&matches), ["B", "B"]);
        assert_eq!(matches.codes, 4);
    }

    #[test]
    fn test_partition_of_codes() {
        let files = [descriptor("x1.csv"), descriptor("y2.csv"), descriptor("z3.txt")];
        let input = codes(&["x", "2", "3", "q", "X"]);
        let matches = match_files(&files, &input, FileTypeFilter::Csv);
        let union: HashSet<&str> =
            matches.matched.iter().flat_map(|m| m.matched_codes.iter().map(ProductCode::as_str)).collect();
        let rest: HashSet<&str> = unmatched(&matches).into_iter().collect();
        assert!(union.is_disjoint(&rest));
        let all: HashSet<&str> = input.iter().map(ProductCode::as_str).collect();
        assert_eq!(union.union(&rest).copied().collect::<HashSet<_>>(), all);
        assert_eq!(unmatched(&matches), ["3", "q"]);
    }

    #[test]
    fn test_filter_files() {
        let files = [descriptor("a.XLS"), descriptor("b.xlsx"), descriptor("c.csv"), descriptor("README")];
        let paths: Vec<&str> = filter_files(&files, FileTypeFilter::Excel).iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a.XLS", "b.xlsx"]);
        assert_eq!(filter_files(&files, FileTypeFilter::All).len(), 4);
    }
}
