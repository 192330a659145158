//! Common error types for pollscore

use thiserror::Error;

/// Common result type for pollscore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while describing periods and loading configuration
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Period text that cannot be parsed
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Period length given both inline and explicitly
    #[error("Ambiguous specification of period length: {0}")]
    AmbiguousPeriod(String),

    /// Two configured sessions share at least one instant
    #[error("Sessions are not disjoint: {earlier} overlaps {later}")]
    OverlappingSessions { earlier: String, later: String },

    /// Question declared before any session
    #[error("Question '{label}' specified without session")]
    QuestionWithoutSession { label: String },

    /// Question declared for a session whose answer list is already fixed
    #[error("Question '{label}' specified for session {session} with an answer list already available")]
    AnswerListFixed { session: String, label: String },

    /// Correctness score without any accepted answer
    #[error("No correct answer specified for question '{label}' of session {session}, but score for correct answer nonzero")]
    InvalidRule { session: String, label: String },
}
