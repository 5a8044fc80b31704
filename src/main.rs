//! filematch: find files by product code and package them into a ZIP archive.

mod cli;
mod error;

use crate::cli::Args;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use filematch_entry::Entry;
use filematch_library::messages::{Language, Message, format_file_size};
use filematch_library::pack::DirectoryTarget;
use filematch_library::progress::{Phase, ProgressReporter};
use filematch_library::{Matches, Outcome, Session, Severity};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("filematch={}", args.log_level()).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(error = ?err, "Aborted");
            eprintln!("error: {}", &*err);
            ExitCode::from(2)
        },
    }
}

/// Returns whether every step ended successfully.
async fn run(args: Args) -> Result<bool> {
    let config = args.config()?;
    let language = config.language;

    let code_text = args.code_text().await?;
    let mut entries = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        entries.push(Entry::open(input).await.or_raise(|| ErrorKind::Input(input.clone()))?);
    }

    let session = Session::new(config.session_options());
    watch_progress(session.processing_progress(), language);
    watch_progress(session.zip_progress(), language);

    let loaded = session.load(entries).await;
    report(&loaded, language);
    if !loaded.is_success() {
        return Ok(false);
    }

    let matched = session.match_codes(&code_text, config.filter).await;
    report(&matched, language);
    if let Some(matches) = session.matches().await {
        list_matches(&matches, language);
    }
    if !matched.is_success() {
        return Ok(false);
    }

    if args.dry_run {
        tracing::info!("Dry run; not writing an archive");
        return Ok(true);
    }
    let target = DirectoryTarget::new(&config.archive.directory);
    let downloaded = session.download(&target).await;
    report(&downloaded, language);
    if let Outcome::Downloaded { delivered, .. } = &downloaded
        && let Some(location) = &delivered.location
    {
        println!("{} ({})", location.display(), format_file_size(delivered.size));
    }
    Ok(downloaded.is_success())
}

fn report(outcome: &Outcome, language: Language) {
    let message = outcome.message(language);
    match outcome.severity() {
        Severity::Error => eprintln!("{message}"),
        Severity::Warning => println!("! {message}"),
        Severity::Success => println!("✓ {message}"),
        Severity::Info => println!("{message}"),
    }
}

fn list_matches(matches: &Matches, language: Language) {
    if !matches.matched.is_empty() {
        println!();
        println!("{}:", Message::MatchedFiles.template(language));
        for matched in &matches.matched {
            let codes: Vec<&str> = matched.matched_codes.iter().map(|code| code.as_str()).collect();
            println!(
                "  {} • {}  [{}]",
                matched.file.path,
                format_file_size(matched.file.size),
                codes.join(", ")
            );
        }
    }
    if !matches.unmatched.is_empty() {
        println!();
        println!("{}:", Message::UnmatchedCodes.template(language));
        println!("  {}", Message::UnmatchedCodesDescription.template(language));
        for code in &matches.unmatched {
            println!("  - {code}");
        }
    }
}

/// Announce the reporter's phase on stderr each time it starts.
fn watch_progress(reporter: &ProgressReporter, language: Language) {
    let mut receiver = reporter.subscribe();
    tokio::spawn(async move {
        let mut phase = Phase::Idle;
        while receiver.changed().await.is_ok() {
            let progress = *receiver.borrow_and_update();
            if progress.phase != phase {
                match progress.phase {
                    Phase::ProcessingFiles => eprintln!("{}", Message::ProcessingFiles.template(language)),
                    Phase::CreatingZip => eprintln!("{}", Message::CreatingZipFile.template(language)),
                    Phase::Idle => {},
                }
                phase = progress.phase;
            }
            tracing::trace!(phase = ?progress.phase, percent = progress.percent, "Progress");
        }
    });
}
