//! Command-line Arguments

use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use filematch_classify::FileTypeFilter;
use filematch_config::Config;
use filematch_library::messages::Language;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

/// Find files whose names contain product codes and package them into a ZIP archive.
#[derive(Debug, Parser)]
#[command(name = "filematch", version, about)]
pub struct Args {
    /// Files and directories to search.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Product codes, separated by commas or newlines. May be repeated.
    #[arg(short, long = "codes", value_name = "TEXT")]
    pub codes: Vec<String>,
    /// Read product codes from a file, or from stdin with `-`.
    #[arg(long, value_name = "PATH")]
    pub codes_file: Option<String>,
    /// Only match files of this type.
    #[arg(short = 't', long, value_name = "TYPE", value_parser = parse_filter)]
    pub filter: Option<FileTypeFilter>,
    /// Directory the archive is saved in.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// File name of the archive.
    #[arg(long, value_name = "FILE")]
    pub name: Option<String>,
    /// Language of messages.
    #[arg(long, value_name = "LANG", value_parser = parse_language)]
    pub lang: Option<Language>,
    /// Match and report without writing an archive.
    #[arg(long)]
    pub dry_run: bool,
    /// Configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// More logging; repeat for even more.
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
    /// Less logging; repeat for even less.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

fn parse_filter(value: &str) -> std::result::Result<FileTypeFilter, String> {
    value.parse().map_err(|e: filematch_classify::error::Error| (*e).to_string())
}

fn parse_language(value: &str) -> std::result::Result<Language, String> {
    value.parse().map_err(|e: filematch_library::error::Error| (*e).to_string())
}

impl Args {
    /// Default log level for this crate family, before `RUST_LOG` is consulted.
    pub fn log_level(&self) -> &'static str {
        match (self.verbose, self.quiet) {
            (0, 0) => "info",
            (1, _) => "debug",
            (2.., _) => "trace",
            (_, 1) => "warn",
            (_, 2..) => "error",
        }
    }

    /// Command-line values take precedence over configured ones.
    pub fn apply(&self, config: &mut Config) {
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        if let Some(language) = self.lang {
            config.language = language;
        }
        if let Some(output) = &self.output {
            config.archive.directory = output.clone();
        }
        if let Some(name) = &self.name {
            config.archive.name = name.clone();
        }
    }

    /// The configuration with command-line overrides applied, validated as a whole.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::read(self.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        self.apply(&mut config);
        config.validate().or_raise(|| ErrorKind::Config)?;
        Ok(config)
    }

    /// All product code text given on the command line, one source per line.
    pub async fn code_text(&self) -> Result<String> {
        let mut sources = self.codes.clone();
        match self.codes_file.as_deref() {
            Some("-") => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .or_raise(|| ErrorKind::Codes("stdin".to_string()))?;
                sources.push(text);
            },
            Some(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .or_raise(|| ErrorKind::Codes(path.to_string()))?;
                sources.push(text);
            },
            None => {},
        }
        Ok(sources.join("\n"))
    }
}
