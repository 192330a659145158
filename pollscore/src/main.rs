//! pollscore - Main entry point
//!
//! Reads the configuration, the poll reports and the roster, and writes the
//! score file for upload to the course management system.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pollscore::extractors::{expand_patterns, PollReportReader, RosterReader};
use pollscore::services::SubmissionWriter;
use pollscore::{Poll, PollError};
use pollscore_common::PollConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for pollscore
#[derive(Parser, Debug)]
#[command(name = "pollscore")]
#[command(about = "Score poll reports for upload to a course management system")]
#[command(version)]
struct Args {
    /// Poll report files, replacing the configured report patterns
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Configuration file
    #[arg(short, long, default_value = "config", env = "POLLSCORE_CONFIG")]
    config: PathBuf,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pollscore=info,pollscore_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "pollscore {} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = PollConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;

    let report_files = if args.files.is_empty() {
        let files = expand_patterns(&config.poll_reports)
            .context("Failed to resolve configured report files")?;
        info!("Configured report files: {:?}", files);
        files
    } else {
        info!(
            "Report files overridden by command line. Working with: {:?}",
            args.files
        );
        args.files
    };

    info!(
        "Configured sessions: {}",
        config
            .sessions
            .iter()
            .map(|s| s.period.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let records = PollReportReader::new()
        .read_all(&report_files)
        .context("Failed to read poll reports")?;

    let roster_path = config
        .roster
        .clone()
        .ok_or(PollError::MissingSetting("roster"))?;
    let upload_path = config
        .upload
        .clone()
        .ok_or(PollError::MissingSetting("upload"))?;

    let roster = RosterReader::new(config.roster_id_column.as_str())
        .read(&roster_path)
        .with_context(|| format!("Failed to read roster {}", roster_path.display()))?;

    let poll = Poll::new(config, records, &roster).context("Failed to score poll")?;

    info!("Writing score file");
    SubmissionWriter::new()
        .write(poll.roster_table(), &upload_path)
        .with_context(|| format!("Failed to write {}", upload_path.display()))?;

    for (label, max) in poll.maxima() {
        info!("Maximum {}: {}", label, max);
    }
    info!("Report in {} is ready for upload", upload_path.display());

    Ok(())
}
