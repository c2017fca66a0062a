//! Fetch every URL listed in a file into a directory.
//!
//! Run with
//!
//! ```not_rust
//! fetchall -i urls.txt -o output
//! ```

use clap::{CommandFactory, Parser};
use color_eyre::{eyre::Report, Result};
use fetchall::{
    downloader::DownloaderBuilder, logging::DiagnosticLog, progress::ProgressBarOpts,
    sink::FailureSink, source::LineSource,
};
use indicatif::HumanDuration;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

const BANNER: &str = r"
   __      _       _            _ _
  / _| ___| |_ ___| |__   __ _ | | |
 | |_ / _ \ __/ __| '_ \ / _` || | |
 |  _|  __/ || (__| | | | (_| || | |
 |_|  \___|\__\___|_| |_|\__,_||_|_|
";

const WARNINGS: [&str; 2] = [
    "[WARN] - Use responsibly. Your actions are your own.",
    "[WARN] - The developer disclaims any liability for misuse or damage.",
];

/// Download every URL listed in a file, all at once.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file containing URLs, one per line.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,
    /// Output directory, created if missing.
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    output: PathBuf,
    /// Cap the number of simultaneous downloads. Unbounded by default.
    #[arg(short = 'c', long, value_name = "N")]
    concurrent_downloads: Option<usize>,
    /// Do not display the progress line.
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    // Setup the application.
    color_eyre::install()?;

    // No arguments at all is a request for help.
    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }
    let cli = Cli::parse();

    println!("{BANNER}");
    for warning in WARNINGS {
        println!("{warning}");
    }

    let started = Instant::now();
    println!("[INFO] - Processing started");

    // Prepare the downloader and the output directory.
    let mut builder = DownloaderBuilder::new().directory(cli.output.clone());
    if let Some(n) = cli.concurrent_downloads {
        builder = builder.concurrent_downloads(n);
    }
    if cli.quiet {
        builder = builder.progress(ProgressBarOpts::hidden());
    }
    let downloader = builder.build();
    downloader.prepare()?;

    // Open the run's log and failure file.
    let log = DiagnosticLog::open(&cli.output)?;
    let failures = Arc::new(FailureSink::open(&cli.output).inspect_err(|e| {
        log.in_scope(|| error!("{e}"));
    })?);

    println!("[IN] - Input file: {}", cli.input.display());
    println!("[INFO] - Output directory: {}\n", cli.output.display());

    let source = LineSource::count(&cli.input).inspect_err(|e| {
        log.in_scope(|| error!("{e}"));
    })?;
    let report = downloader
        .download(&source, failures.clone(), &log)
        .await
        .inspect_err(|e| {
            log.in_scope(|| error!("{e}"));
        })?;

    if report.failed() > 0 {
        println!(
            "\n[INFO] - {} of {} URLs failed, see {}",
            report.failed(),
            source.total(),
            failures.path().display()
        );
    }
    println!("\n[OUT] - All files saved in {}", cli.output.display());
    println!("[INFO] - Completed in {}", HumanDuration(started.elapsed()));

    Ok(())
}
