//! # Pollscore Common Library
//!
//! Shared code for the pollscore workspace including:
//! - Time periods used as session keys
//! - Configuration builder and TOML loading
//! - Common error types

pub mod config;
pub mod error;
pub mod period;

pub use config::{AnswerSpec, PollConfig, PollConfigBuilder, QuestionSpec, Session, SessionConfig};
pub use error::{Error, Result};
pub use period::{Frequency, FrequencyUnit, Period, PeriodOrdering};
