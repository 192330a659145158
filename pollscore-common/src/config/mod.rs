//! Poll configuration
//!
//! Sessions and questions are declared in order through [`PollConfigBuilder`]:
//! a question always belongs to the most recently declared session, and a
//! session declared with a positional answer key accepts no further questions.
//! The builder is fed either directly from code or from a TOML file
//! ([`PollConfig::load`]); both paths go through the same checks.

mod file;

use crate::period::{find_overlap, Period};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Roster column holding the participant identifier unless configured otherwise
pub const DEFAULT_ROSTER_ID_COLUMN: &str = "SIS Login ID";

/// Accepted answers for one question, as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnswerSpec {
    One(String),
    Many(Vec<String>),
}

impl AnswerSpec {
    /// No non-empty answer; an empty answer can never be given
    pub fn is_empty(&self) -> bool {
        self.answers().next().is_none()
    }

    /// Accepted answers as a set, empty strings left out; a single string is
    /// one answer
    pub fn to_set(&self) -> BTreeSet<String> {
        self.answers().map(String::from).collect()
    }

    fn answers(&self) -> impl Iterator<Item = &str> {
        let answers: &[String] = match self {
            AnswerSpec::One(answer) => std::slice::from_ref(answer),
            AnswerSpec::Many(answers) => answers,
        };
        answers.iter().map(String::as_str).filter(|a| !a.is_empty())
    }
}

impl From<&str> for AnswerSpec {
    fn from(answer: &str) -> Self {
        AnswerSpec::One(answer.to_string())
    }
}

/// Scoring declared for one question of an explicit-form session
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSpec {
    pub participation: f64,
    pub correct: f64,
    pub answers: Option<AnswerSpec>,
}

/// Scoring configuration attached to a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionConfig {
    /// Comma-separated answer key aligned with questions in chronological order
    AnswerKey {
        key: String,
        participation: f64,
        correct: f64,
    },
    /// Rules per question label
    Explicit {
        /// Participation score for answered questions without a rule; `None`
        /// defers to the poll-level default
        participation: Option<f64>,
        questions: BTreeMap<String, QuestionSpec>,
    },
}

/// A period used as scoring unit, with its configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub period: Period,
    pub config: SessionConfig,
}

impl Session {
    /// Session without any question declarations
    pub fn unconfigured(period: Period) -> Self {
        Self {
            period,
            config: SessionConfig::Explicit {
                participation: None,
                questions: BTreeMap::new(),
            },
        }
    }
}

/// Validated poll configuration
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Course email domain suffix, e.g. `@example.edu`
    pub domain: String,
    pub roster: Option<PathBuf>,
    pub upload: Option<PathBuf>,
    /// Glob patterns locating poll report files
    pub poll_reports: Vec<String>,
    /// Lower-cased response email → full course email
    pub aliases: BTreeMap<String, String>,
    /// Lower-cased response emails excluded from matching
    pub ignore_responses: BTreeSet<String>,
    pub ignore_roster: BTreeSet<String>,
    pub default_participation: f64,
    pub default_correct: f64,
    pub participation_column: Option<String>,
    pub correctness_column: Option<String>,
    pub total_column: Option<String>,
    pub roster_id_column: String,
    /// Keep roster rows that matched no response
    pub include_unmatched_roster: bool,
    /// Configured sessions, pairwise disjoint, in chronological order
    pub sessions: Vec<Session>,
}

impl PollConfig {
    pub fn builder() -> PollConfigBuilder {
        PollConfigBuilder::new()
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        file::load(path)
    }
}

/// Accumulates declarations and validates them as they arrive
#[derive(Debug, Clone)]
pub struct PollConfigBuilder {
    domain: String,
    roster: Option<PathBuf>,
    upload: Option<PathBuf>,
    poll_reports: Vec<String>,
    aliases: BTreeMap<String, String>,
    ignore_responses: BTreeSet<String>,
    ignore_roster: BTreeSet<String>,
    participation: f64,
    correct: f64,
    participation_column: Option<String>,
    correctness_column: Option<String>,
    total_column: Option<String>,
    roster_id_column: String,
    include_unmatched_roster: bool,
    sessions: Vec<Session>,
    current: Option<usize>,
}

impl Default for PollConfigBuilder {
    fn default() -> Self {
        Self {
            domain: String::new(),
            roster: None,
            upload: None,
            poll_reports: Vec::new(),
            aliases: BTreeMap::new(),
            ignore_responses: BTreeSet::new(),
            ignore_roster: BTreeSet::new(),
            participation: 0.0,
            correct: 0.0,
            participation_column: None,
            correctness_column: None,
            total_column: None,
            roster_id_column: DEFAULT_ROSTER_ID_COLUMN.to_string(),
            include_unmatched_roster: false,
            sessions: Vec::new(),
            current: None,
        }
    }
}

impl PollConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(&mut self, domain: impl Into<String>) -> &mut Self {
        self.domain = domain.into();
        self
    }

    pub fn roster(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.roster = Some(path.into());
        self
    }

    pub fn upload(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.upload = Some(path.into());
        self
    }

    pub fn poll_report(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.poll_reports.push(pattern.into());
        self
    }

    /// Map a response email onto a course email or bare roster identifier
    pub fn alias(&mut self, email: impl Into<String>, target: impl Into<String>) -> &mut Self {
        self.aliases.insert(email.into(), target.into());
        self
    }

    pub fn ignore_response(&mut self, email: impl Into<String>) -> &mut Self {
        self.ignore_responses.insert(email.into());
        self
    }

    pub fn ignore_roster(&mut self, id: impl Into<String>) -> &mut Self {
        self.ignore_roster.insert(id.into());
        self
    }

    /// Participation score used by declarations that follow
    pub fn default_participation(&mut self, score: f64) -> &mut Self {
        self.participation = score;
        self
    }

    /// Correctness score used by declarations that follow
    pub fn default_correct(&mut self, score: f64) -> &mut Self {
        self.correct = score;
        self
    }

    pub fn participation_column(&mut self, label: impl Into<String>) -> &mut Self {
        self.participation_column = Some(label.into());
        self
    }

    pub fn correctness_column(&mut self, label: impl Into<String>) -> &mut Self {
        self.correctness_column = Some(label.into());
        self
    }

    pub fn total_column(&mut self, label: impl Into<String>) -> &mut Self {
        self.total_column = Some(label.into());
        self
    }

    pub fn roster_id_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.roster_id_column = column.into();
        self
    }

    pub fn include_unmatched_roster(&mut self, include: bool) -> &mut Self {
        self.include_unmatched_roster = include;
        self
    }

    /// Open a session, optionally fixing its scoring with a positional answer key
    ///
    /// The session captures the current default scores. Declaring a period
    /// that is already present replaces its earlier configuration.
    pub fn session(&mut self, period: Period, answer_key: Option<&str>) -> &mut Self {
        let config = match answer_key {
            Some(key) => SessionConfig::AnswerKey {
                key: key.to_string(),
                participation: self.participation,
                correct: self.correct,
            },
            None => SessionConfig::Explicit {
                participation: Some(self.participation),
                questions: BTreeMap::new(),
            },
        };

        match self.sessions.iter().position(|s| s.period == period) {
            Some(index) => {
                warn!(session = %period, "Session declared again, replacing earlier declaration");
                self.sessions[index].config = config;
                self.current = Some(index);
            }
            None => {
                self.sessions.push(Session { period, config });
                self.current = Some(self.sessions.len() - 1);
            }
        }
        self
    }

    /// Declare scoring for one question of the open session
    ///
    /// # Errors
    /// - no session declared yet
    /// - the open session already has a positional answer key
    /// - a nonzero correctness score without any accepted answer
    pub fn question(
        &mut self,
        label: &str,
        answers: Option<AnswerSpec>,
        participation: Option<f64>,
        correct: Option<f64>,
    ) -> Result<&mut Self> {
        let index = self.current.ok_or_else(|| Error::QuestionWithoutSession {
            label: label.to_string(),
        })?;
        let (default_participation, default_correct) = (self.participation, self.correct);

        let session = &mut self.sessions[index];
        let questions = match &mut session.config {
            SessionConfig::Explicit { questions, .. } => questions,
            SessionConfig::AnswerKey { .. } => {
                return Err(Error::AnswerListFixed {
                    session: session.period.to_string(),
                    label: label.to_string(),
                })
            }
        };

        let has_answers = answers.as_ref().is_some_and(|a| !a.is_empty());
        let correct = if has_answers {
            correct.unwrap_or(default_correct)
        } else {
            if correct.is_some_and(|score| score != 0.0) {
                return Err(Error::InvalidRule {
                    session: session.period.to_string(),
                    label: label.to_string(),
                });
            }
            0.0
        };

        questions.insert(
            label.to_string(),
            QuestionSpec {
                participation: participation.unwrap_or(default_participation),
                correct,
                answers,
            },
        );
        Ok(self)
    }

    /// Validate and freeze the configuration
    pub fn build(&self) -> Result<PollConfig> {
        if let Some((earlier, later)) = find_overlap(self.sessions.iter().map(|s| &s.period)) {
            return Err(Error::OverlappingSessions {
                earlier: earlier.to_string(),
                later: later.to_string(),
            });
        }

        let aliases = self
            .aliases
            .iter()
            .map(|(email, target)| {
                let target = if target.ends_with(&self.domain) {
                    target.clone()
                } else {
                    format!("{}{}", target, self.domain)
                };
                (email.to_lowercase(), target)
            })
            .collect();

        let mut sessions = self.sessions.clone();
        sessions.sort_by_key(|s| s.period.start());

        debug!(
            sessions = sessions.len(),
            aliases = self.aliases.len(),
            "Poll configuration built"
        );

        Ok(PollConfig {
            domain: self.domain.clone(),
            roster: self.roster.clone(),
            upload: self.upload.clone(),
            poll_reports: self.poll_reports.clone(),
            aliases,
            ignore_responses: self.ignore_responses.iter().map(|e| e.to_lowercase()).collect(),
            ignore_roster: self.ignore_roster.clone(),
            default_participation: self.participation,
            default_correct: self.correct,
            participation_column: self.participation_column.clone(),
            correctness_column: self.correctness_column.clone(),
            total_column: self.total_column.clone(),
            roster_id_column: self.roster_id_column.clone(),
            include_unmatched_roster: self.include_unmatched_roster,
            sessions,
        })
    }
}
