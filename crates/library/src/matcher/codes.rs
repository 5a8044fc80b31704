use derive_more::Display;

/// A single product code to look for in file names.
///
/// Always trimmed and non-empty. Matching is case-insensitive, so the
/// lowercased form is kept alongside the code as typed.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display("{code}")]
pub struct ProductCode {
    code: String,
    folded: String,
}

impl ProductCode {
    /// Build a code from raw text; `None` if nothing is left after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let code = raw.trim();
        if code.is_empty() {
            return None;
        }
        Some(Self {
            code: code.to_string(),
            folded: code.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Whether this code occurs anywhere in `name`, ignoring case.
    pub fn is_in(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.folded)
    }

    pub(crate) fn is_in_folded(&self, folded_name: &str) -> bool {
        folded_name.contains(&self.folded)
    }
}

/// Split free-form text into product codes.
///
/// Codes are separated by commas and/or newlines. Surrounding whitespace is
/// trimmed and empty tokens are dropped; duplicates are kept in input order.
///
/// # Examples
///
/// ```
/// use filematch_library::matcher::parse_codes;
///
/// let codes = parse_codes(" DCA-4901,\n\nDcb-3312 , ,DCA-4901");
/// let codes: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
/// assert_eq!(codes, ["DCA-4901", "Dcb-3312", "DCA-4901"]);
/// ```
pub fn parse_codes(text: &str) -> Vec<ProductCode> {
    text.split([',', '\n']).filter_map(ProductCode::new).collect()
}
