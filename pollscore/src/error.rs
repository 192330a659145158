//! Error types for pollscore
//!
//! Every variant is fatal for the run. Conditions that only need an operator's
//! attention (synthesized sessions, unmatched emails, answer-key mismatches) are
//! reported through logging and returned as data instead.

use pollscore_common::Period;
use std::path::PathBuf;
use thiserror::Error;

/// Poll processing error type
#[derive(Debug, Error)]
pub enum PollError {
    /// Configuration or period error from pollscore-common
    #[error(transparent)]
    Common(#[from] pollscore_common::Error),

    /// Cannot read or write a file
    #[error("File access error {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Invalid glob pattern for report files
    #[error("Invalid report file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// First line matches none of the known poll report layouts
    #[error("Unrecognized poll report format in file '{}'", .0.display())]
    UnrecognizedFormat(PathBuf),

    /// Poll report without a response header line
    #[error("No poll response header found in file '{}'", .0.display())]
    MissingHeader(PathBuf),

    /// Response row that cannot be interpreted
    #[error("Invalid record in '{}' line {line}: {message}", .path.display())]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Same participant answered the same question twice in one session
    #[error("Multiple responses from {email} to question '{label}' in session {session}")]
    DuplicateResponse {
        session: Period,
        label: String,
        email: String,
    },

    /// Correctness score without accepted answers
    #[error("Cannot score question '{label}' of session {session} for correctness: no correct answers specified")]
    InvalidRule { session: Period, label: String },

    /// Roster lacks a required column
    #[error("Roster has no column '{column}'")]
    MissingRosterColumn { column: String },

    /// Roster lacks the "Points Possible" row that precedes participant rows
    #[error("No 'Points Possible' row found in roster file '{}'", .0.display())]
    MissingRosterMarker(PathBuf),

    /// Neither the command line nor the configured patterns named any report
    #[error("No poll report files to process")]
    NoReportFiles,

    /// Required configuration entry absent
    #[error("Configuration does not specify '{0}'")]
    MissingSetting(&'static str),
}

/// Result type for poll processing
pub type Result<T> = std::result::Result<T, PollError>;
