//! Poll processing services
//!
//! Pipeline stages in the order a run applies them:
//! session assignment, question ordering, rule resolution, identity
//! matching, score aggregation and writing the submission file.

pub mod identity_matcher;
pub mod question_orderer;
pub mod score_aggregator;
pub mod scoring_resolver;
pub mod session_assigner;
pub mod submission_writer;

pub use identity_matcher::{IdentityMatch, IdentityMatcher};
pub use question_orderer::{QuestionOrder, QuestionSpan};
pub use score_aggregator::{RosterMerger, ScoreColumn, ScoreKind, ScoreTable};
pub use scoring_resolver::{ScoringResolver, ScoringRules, ScoringWarning};
pub use session_assigner::{SessionAssigner, SessionAssignment};
pub use submission_writer::SubmissionWriter;
