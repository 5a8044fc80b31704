//! User-facing text in English and Chinese.
//!
//! Templates contain `{name}` placeholders which [`format_message`] fills in.

use crate::error::{Error, ErrorKind};
use derive_more::Display;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[display("en")]
    En,
    #[display("zh")]
    Zh,
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Ok(Self::En),
            "zh" | "zh-cn" | "zh-hans" | "chinese" => Ok(Self::Zh),
            _ => exn::bail!(ErrorKind::UnknownLanguage(s.to_string())),
        }
    }
}

/// Every piece of user-facing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Message {
    PleaseUploadFiles,
    PleaseEnterCodes,
    PleaseEnterValidCodes,
    /// `{type}`
    NoFilesOfType,
    /// `{count}` files searched.
    NoFilesMatched,
    /// `{count}` files matched.
    FoundMatchingFiles,
    /// `{count}` codes unmatched.
    CodesNotFound,
    NoMatchedFilesToDownload,
    /// `{count}` files in the archive.
    DownloadedFilesAsZip,
    ErrorCreatingZip,
    /// `{name}` of the archive.
    ErrorSavingZip,
    /// `{count}` files loaded.
    SuccessfullyLoadedFiles,
    /// `{count}` entries skipped.
    SkippedEntries,
    /// `{operation}` already running.
    AlreadyInProgress,
    CreatingZipFile,
    ProcessingFiles,
    MatchingFiles,
    MatchedFiles,
    UnmatchedCodes,
    UnmatchedCodesDescription,
}

impl Message {
    /// The raw template, placeholders and all.
    pub fn template(self, language: Language) -> &'static str {
        match language {
            Language::En => self.english(),
            Language::Zh => self.chinese(),
        }
    }

    /// Render this message with `params`.
    pub fn format(self, language: Language, params: &[(&str, String)]) -> String {
        format_message(self.template(language), params)
    }

    fn english(self) -> &'static str {
        match self {
            Self::PleaseUploadFiles => "Please upload files first",
            Self::PleaseEnterCodes => "Please enter product codes to match",
            Self::PleaseEnterValidCodes => "Please enter valid product codes",
            Self::NoFilesOfType => "No loaded files match the file type filter: {type}",
            Self::NoFilesMatched => "No files matched the given product codes. Searched in {count} files.",
            Self::FoundMatchingFiles => "Found {count} matching files",
            Self::CodesNotFound => "{count} product codes were not found",
            Self::NoMatchedFilesToDownload => "No matched files to download",
            Self::DownloadedFilesAsZip => "Downloaded {count} files as ZIP",
            Self::ErrorCreatingZip => "Error creating ZIP file. Please try again.",
            Self::ErrorSavingZip => "Error saving {name}. Please try again.",
            Self::SuccessfullyLoadedFiles => "Successfully loaded {count} files",
            Self::SkippedEntries => "Skipped {count} unreadable entries",
            Self::AlreadyInProgress => "{operation} is already in progress",
            Self::CreatingZipFile => "Creating ZIP file...",
            Self::ProcessingFiles => "Processing files...",
            Self::MatchingFiles => "Matching files...",
            Self::MatchedFiles => "Matched Files",
            Self::UnmatchedCodes => "Unmatched Product Codes",
            Self::UnmatchedCodesDescription => "These product codes were not found in any uploaded files",
        }
    }

    fn chinese(self) -> &'static str {
        match self {
            Self::PleaseUploadFiles => "请先上传文件",
            Self::PleaseEnterCodes => "请输入要匹配的产品代码",
            Self::PleaseEnterValidCodes => "请输入有效的产品代码",
            Self::NoFilesOfType => "没有已加载的文件符合文件类型过滤器：{type}",
            Self::NoFilesMatched => "没有文件匹配给定的产品代码。在{count}个文件中搜索。",
            Self::FoundMatchingFiles => "找到{count}个匹配文件",
            Self::CodesNotFound => "{count}个产品代码未找到",
            Self::NoMatchedFilesToDownload => "没有匹配的文件可下载",
            Self::DownloadedFilesAsZip => "已下载{count}个文件为ZIP",
            Self::ErrorCreatingZip => "创建ZIP文件时出错。请重试。",
            Self::ErrorSavingZip => "保存{name}时出错。请重试。",
            Self::SuccessfullyLoadedFiles => "成功加载{count}个文件",
            Self::SkippedEntries => "跳过了{count}个无法读取的条目",
            Self::AlreadyInProgress => "{operation}正在进行中",
            Self::CreatingZipFile => "创建ZIP文件中...",
            Self::ProcessingFiles => "处理文件中...",
            Self::MatchingFiles => "匹配文件中...",
            Self::MatchedFiles => "匹配的文件",
            Self::UnmatchedCodes => "未匹配的产品代码",
            Self::UnmatchedCodesDescription => "这些产品代码在已上传的文件中未找到",
        }
    }
}

/// Replace `{key}` placeholders in `template` with the matching value from
/// `params`. Placeholders without a value are left as they are.
///
/// # Examples
///
/// ```
/// use filematch_library::messages::format_message;
///
/// let text = format_message("Found {count} files in {folder}", &[("count", 3.to_string())]);
/// assert_eq!(text, "Found 3 files in {folder}");
/// ```
pub fn format_message(template: &str, params: &[(&str, String)]) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |captures: &Captures| match params.iter().find(|(key, _)| *key == &captures[1]) {
            Some((_, value)) => value.clone(),
            None => captures[0].to_string(),
        })
        .into_owned()
}

/// Human-readable size using 1024-based units, rounded to two decimals
/// (`0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
