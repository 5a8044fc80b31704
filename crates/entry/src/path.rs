//! Relative path construction and validation.
//!
//! Entry paths are slash-separated strings (they end up as archive entry
//! names, which are always `/`-separated regardless of platform). These
//! helpers build them from entry names and make sure they never escape the
//! archive root.

use crate::error::{ErrorKind, Result};

/// Join a parent path and a child name with a single `/`.
///
/// An empty or missing parent means the child sits at the root.
///
/// # Examples
///
/// ```
/// use filematch_entry::join_path;
/// assert_eq!(join_path(None, "report.pdf"), "report.pdf");
/// assert_eq!(join_path(Some(""), "report.pdf"), "report.pdf");
/// assert_eq!(join_path(Some("folderA/sub"), "report.pdf"), "folderA/sub/report.pdf");
/// ```
pub fn join(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{parent}/{name}"),
        _ => name.to_string(),
    }
}

/// Validates a relative path for use as an archive entry name.
///
/// Ensures that paths don't escape the archive root (no `..` traversal) and
/// normalizes redundant separators and `.` segments.
///
/// > **Note:** This does **not** normalize backslashes; on Unix they are
/// >           legal file name characters. Null bytes are explicitly rejected.
///
/// # Examples
///
/// ```
/// use filematch_entry::validate_path;
/// // Valid paths
/// assert!(validate_path("folderA/sub/report.pdf").is_ok());
/// assert!(validate_path("a/../file.pdf").is_ok()); // (never leaves the root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err());
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(validate_path("/wrong/../correct//./path.pdf/").unwrap(), "correct/path.pdf");
/// ```
pub fn validate(path: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_string()));
                }
            },
            // Null bytes cause truncation in C-based tooling that reads the
            // archive later on; reject them explicitly.
            s if s.contains('\0') => exn::bail!(ErrorKind::InvalidPath(path.to_string())),
            s => segments.push(s),
        }
    }
    match segments.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.to_string())),
        false => Ok(segments.join("/")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("folderA/sub/report.pdf", "folderA/sub/report.pdf")]
    #[case("simple.pdf", "simple.pdf")]
    #[case("a//b//c", "a/b/c")]
    #[case("a/./b/./c", "a/b/c")]
    #[case("a/b/..", "a")]
    #[case("folder///", "folder")]
    #[case("/rooted/file.txt", "rooted/file.txt")]
    fn test_valid_paths(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(validate(path).unwrap(), expected);
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("a/../../b")]
    #[case("..")]
    #[case("../..")]
    #[case("a\0b")]
    #[case("")]
    #[case(".")]
    #[case("./.")]
    #[case("//")]
    fn test_invalid_paths(#[case] path: &str) {
        let err = validate(path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(p) if p == path));
    }

    #[test]
    fn test_join() {
        assert_eq!(join(None, "a.pdf"), "a.pdf");
        assert_eq!(join(Some("x"), "a.pdf"), "x/a.pdf");
        assert_eq!(join(Some("x/y"), "a.pdf"), "x/y/a.pdf");
    }
}
