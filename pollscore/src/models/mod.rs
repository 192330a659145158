//! Data models for poll processing

pub mod question;
pub mod response;
pub mod roster;
pub mod submission;

pub use question::QuestionRule;
pub use response::{QuestionKey, ResponseRecord, ResponseTable, SessionResponses};
pub use roster::Roster;
pub use submission::SubmissionTable;
