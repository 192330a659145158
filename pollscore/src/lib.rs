//! # pollscore
//!
//! Scores poll reports exported by a video-conferencing tool against
//! configured sessions and a course roster, producing a roster-shaped CSV
//! ready for upload.
//!
//! - [`extractors`]: poll report and roster readers
//! - [`models`]: responses, rules, roster and submission tables
//! - [`services`]: pipeline stages
//! - [`Poll`]: runs the pipeline

pub mod error;
pub mod extractors;
pub mod models;
pub mod poll;
pub mod services;

pub use error::{PollError, Result};
pub use poll::Poll;
