use crate::error::{Error, ErrorKind};
use crate::extension;
use std::fmt;
use std::str::FromStr;

/// A category of files, identified by extension.
///
/// Accepted spellings when parsing (case-insensitive, surrounding whitespace
/// ignored):
///
/// - the category name: `all`, `pdf`, `jpeg`, `png`, `excel`, `word`,
///   `powerpoint`, `text`, `csv`
/// - a comma-separated extension list belonging to a single category, such
///   as `jpg,jpeg` or `xlsx,xls`
/// - a single extension, such as `jpg` or `docx`
///
/// # Examples
///
/// ```
/// use filematch_classify::FileTypeFilter;
///
/// let filter: FileTypeFilter = "xlsx,xls".parse().unwrap();
/// assert_eq!(filter, FileTypeFilter::Excel);
/// assert!(filter.allows("Q3_REPORT.XLS"));
/// assert!(!filter.allows("Q3_REPORT.pdf"));
/// assert!(FileTypeFilter::All.allows("README"));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FileTypeFilter {
    #[default]
    All,
    Pdf,
    Jpeg,
    Png,
    Excel,
    Word,
    PowerPoint,
    Text,
    Csv,
}

impl FileTypeFilter {
    const VARIANTS: [Self; 9] = [
        Self::All,
        Self::Pdf,
        Self::Jpeg,
        Self::Png,
        Self::Excel,
        Self::Word,
        Self::PowerPoint,
        Self::Text,
        Self::Csv,
    ];

    /// Every filter, in presentation order.
    pub fn variants() -> &'static [Self] {
        &Self::VARIANTS
    }

    /// Lowercased extensions belonging to this category; `None` for [`All`](Self::All).
    pub fn extensions(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::All => None,
            Self::Pdf => Some(&["pdf"]),
            Self::Jpeg => Some(&["jpg", "jpeg"]),
            Self::Png => Some(&["png"]),
            Self::Excel => Some(&["xlsx", "xls"]),
            Self::Word => Some(&["docx", "doc"]),
            Self::PowerPoint => Some(&["pptx", "ppt"]),
            Self::Text => Some(&["txt"]),
            Self::Csv => Some(&["csv"]),
        }
    }

    /// Whether a file with this name passes the filter.
    ///
    /// [`All`](Self::All) passes everything, including names without an
    /// extension; every other category requires a matching extension.
    pub fn allows(&self, name: &str) -> bool {
        let Some(allowed) = self.extensions() else {
            return true;
        };
        extension(name).is_some_and(|ext| allowed.contains(&ext.as_str()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pdf => "pdf",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Excel => "excel",
            Self::Word => "word",
            Self::PowerPoint => "powerpoint",
            Self::Text => "text",
            Self::Csv => "csv",
        }
    }

    /// Human-readable label for selection lists.
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All files",
            Self::Pdf => "PDF (.pdf)",
            Self::Jpeg => "JPEG (.jpg, .jpeg)",
            Self::Png => "PNG (.png)",
            Self::Excel => "Excel (.xlsx, .xls)",
            Self::Word => "Word (.docx, .doc)",
            Self::PowerPoint => "PowerPoint (.pptx, .ppt)",
            Self::Text => "Text (.txt)",
            Self::Csv => "CSV (.csv)",
        }
    }

    /// Find the single category owning every extension in `list`.
    fn from_extensions(list: &str) -> Option<Self> {
        let extensions: Vec<&str> = list.split(',').map(|e| e.trim().trim_start_matches('.')).collect();
        if extensions.iter().any(|e| e.is_empty()) {
            return None;
        }
        Self::VARIANTS.into_iter().find(|filter| {
            filter
                .extensions()
                .is_some_and(|owned| extensions.iter().all(|e| owned.contains(e)))
        })
    }
}

impl fmt::Display for FileTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileTypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let filter = match normalized.as_str() {
            "all" | "*" => Self::All,
            "excel" | "spreadsheet" => Self::Excel,
            "word" => Self::Word,
            "powerpoint" => Self::PowerPoint,
            "text" => Self::Text,
            other => match Self::from_extensions(other) {
                Some(filter) => filter,
                None => exn::bail!(ErrorKind::UnknownFilter(s.to_string())),
            },
        };
        Ok(filter)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FileTypeFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FileTypeFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        raw.parse().map_err(|_| serde::de::Error::custom(format!("unknown file type filter: {raw}")))
    }
}
