//! Layered configuration.
//!
//! Values are merged from, in increasing order of precedence:
//!
//! 1. built-in defaults ([`Config::default`]);
//! 2. a TOML file: an explicit path, or `config.toml` in the platform's
//!    configuration directory when it exists;
//! 3. environment variables prefixed with `FILEMATCH_`, with nested keys
//!    separated by `__` (`FILEMATCH_ARCHIVE__NAME=codes.zip`).
//!
//! ```toml
//! language = "en"            # en | zh
//! filter = "all"
//! walk_concurrency = 8
//!
//! [archive]
//! name = "matched_files.zip"
//! compression = "deflated"   # deflated | stored
//! directory = "."
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use filematch_classify::FileTypeFilter;
use filematch_library::messages::Language;
use filematch_library::pack::{ArchiveOptions, Compression, DEFAULT_ARCHIVE_NAME};
use filematch_library::{DEFAULT_WALK_CONCURRENCY, SessionOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "FILEMATCH_";
const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    /// File type filter applied when none is given explicitly.
    pub filter: FileTypeFilter,
    pub walk_concurrency: usize,
    pub archive: ArchiveConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::default(),
            filter: FileTypeFilter::default(),
            walk_concurrency: DEFAULT_WALK_CONCURRENCY,
            archive: ArchiveConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// File name of the archive; must end in `.zip`.
    pub name: String,
    pub compression: Compression,
    /// Where archives are saved.
    pub directory: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_ARCHIVE_NAME.to_string(),
            compression: Compression::default(),
            directory: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Location of the per-user configuration file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "filematch").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Load`](ErrorKind::Load) if a source can't be read or parsed,
    /// or [`Invalid`](ErrorKind::Invalid) if a value fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge the configuration sources without validating the result, so
    /// callers can apply their own overrides first.
    ///
    /// An explicit `path` must exist; the default location is only used when
    /// there is a file there.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => {
                exn::bail!(ErrorKind::Load(format!("config file not found: {}", path.display())));
            },
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        match &file {
            Some(file) => tracing::debug!(path = %file.display(), "Loading configuration file"),
            None => tracing::debug!("No configuration file; using defaults and environment"),
        }
        let config: Self = Self::figment(file.as_deref())
            .extract()
            .map_err(|e| ErrorKind::Load(e.to_string()))?;
        Ok(config)
    }

    /// The merged configuration sources, without validation.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.walk_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("walk_concurrency must be at least 1".to_string()));
        }
        let name = &self.archive.name;
        if name.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("archive.name must not be empty".to_string()));
        }
        if name.contains(['/', '\\']) {
            exn::bail!(ErrorKind::Invalid(format!("archive.name must be a file name, not a path: {name}")));
        }
        if !name.to_lowercase().ends_with(".zip") || name.len() == ".zip".len() {
            exn::bail!(ErrorKind::Invalid(format!("archive.name must end in .zip: {name}")));
        }
        Ok(())
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            name: self.archive.name.clone(),
            compression: self.archive.compression,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            walk_concurrency: self.walk_concurrency,
            archive: self.archive_options(),
        }
    }
}
