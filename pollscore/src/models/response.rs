//! Poll responses
//!
//! A [`ResponseRecord`] is one answer as read from a report file. Records are
//! grouped by session ([`SessionResponses`]) and then pivoted into a
//! [`ResponseTable`] with one row per participant email and one column per
//! (session, question label) pair.

use crate::error::{PollError, Result};
use chrono::NaiveDateTime;
use pollscore_common::{Period, Session};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One answer given by one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Lower-cased participant email
    pub email: String,
    pub time: NaiveDateTime,
    pub question: String,
    pub answer: String,
}

impl ResponseRecord {
    pub fn new(
        email: impl Into<String>,
        time: NaiveDateTime,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            time,
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Identifies a question within a session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionKey {
    pub session: Period,
    pub label: String,
}

impl QuestionKey {
    pub fn new(session: Period, label: impl Into<String>) -> Self {
        Self {
            session,
            label: label.into(),
        }
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' of {}", self.label, self.session)
    }
}

/// Responses falling within one session
#[derive(Debug, Clone)]
pub struct SessionResponses {
    pub session: Session,
    /// Chronological order
    pub records: Vec<ResponseRecord>,
}

/// Answers pivoted by participant and question
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    columns: Vec<QuestionKey>,
    cells: BTreeMap<String, HashMap<QuestionKey, String>>,
}

impl ResponseTable {
    /// Pivot grouped responses into the given column order
    ///
    /// # Errors
    /// [`PollError::DuplicateResponse`] when a participant answered the same
    /// question twice within one session.
    pub fn build(columns: Vec<QuestionKey>, groups: &[SessionResponses]) -> Result<Self> {
        let mut cells: BTreeMap<String, HashMap<QuestionKey, String>> = BTreeMap::new();

        for group in groups {
            for record in &group.records {
                let key = QuestionKey::new(group.session.period, record.question.as_str());
                let row = cells.entry(record.email.clone()).or_default();
                if row.insert(key, record.answer.clone()).is_some() {
                    return Err(PollError::DuplicateResponse {
                        session: group.session.period,
                        label: record.question.clone(),
                        email: record.email.clone(),
                    });
                }
            }
        }

        Ok(Self { columns, cells })
    }

    pub fn columns(&self) -> &[QuestionKey] {
        &self.columns
    }

    /// Participant emails in sorted order
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Answer given by `email` to `key`, `None` when not answered
    pub fn answer(&self, email: &str, key: &QuestionKey) -> Option<&str> {
        self.cells.get(email)?.get(key).map(String::as_str)
    }

    /// Number of participants
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
