//! Input file readers
//!
//! - [`PollReportReader`]: poll report exports of the conferencing tool
//! - [`RosterReader`]: roster export of the course management system

pub mod poll_report;
pub mod roster_reader;

pub use poll_report::{expand_patterns, PollReportReader, ReportLayout};
pub use roster_reader::RosterReader;
