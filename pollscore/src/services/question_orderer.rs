//! Question ordering within sessions
//!
//! Reports do not say in which order questions were asked, so it is inferred
//! from response times: questions are ordered by their earliest response, ties
//! broken by label.

use crate::models::SessionResponses;
use chrono::NaiveDateTime;
use pollscore_common::Period;
use std::collections::{BTreeMap, HashMap};

/// Time range over which one question received responses
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSpan {
    pub label: String,
    pub first_response: NaiveDateTime,
    pub last_response: NaiveDateTime,
}

impl QuestionSpan {
    /// Period covering all responses to the question
    pub fn period(&self) -> Period {
        Period::between(self.first_response, self.last_response)
    }
}

/// Inferred question order per session
#[derive(Debug, Clone, Default)]
pub struct QuestionOrder {
    sessions: HashMap<Period, Vec<QuestionSpan>>,
}

impl QuestionOrder {
    /// Sessions without responses get no entry
    pub fn from_groups(groups: &[SessionResponses]) -> Self {
        let mut sessions = HashMap::new();

        for group in groups {
            let mut ranges: BTreeMap<&str, (NaiveDateTime, NaiveDateTime)> = BTreeMap::new();
            for record in &group.records {
                ranges
                    .entry(record.question.as_str())
                    .and_modify(|(first, last)| {
                        *first = (*first).min(record.time);
                        *last = (*last).max(record.time);
                    })
                    .or_insert((record.time, record.time));
            }
            if ranges.is_empty() {
                continue;
            }

            let mut spans: Vec<QuestionSpan> = ranges
                .into_iter()
                .map(|(label, (first_response, last_response))| QuestionSpan {
                    label: label.to_string(),
                    first_response,
                    last_response,
                })
                .collect();
            spans.sort_by(|a, b| {
                a.first_response
                    .cmp(&b.first_response)
                    .then_with(|| a.label.cmp(&b.label))
            });
            sessions.insert(group.session.period, spans);
        }

        Self { sessions }
    }

    /// Whether the session received any response
    pub fn contains(&self, session: &Period) -> bool {
        self.sessions.contains_key(session)
    }

    pub fn spans(&self, session: &Period) -> &[QuestionSpan] {
        self.sessions.get(session).map(Vec::as_slice).unwrap_or_default()
    }

    /// Question labels of the session in asking order
    pub fn labels(&self, session: &Period) -> Vec<&str> {
        self.spans(session).iter().map(|s| s.label.as_str()).collect()
    }
}
