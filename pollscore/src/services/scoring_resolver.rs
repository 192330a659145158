//! Scoring rule resolution
//!
//! Turns each session's configuration into one [`QuestionRule`] per observed
//! question. A positional answer key is matched against questions in asking
//! order; explicit configuration is matched by label, with unconfigured
//! questions falling back to the poll-level participation score.

use crate::error::Result;
use crate::models::{QuestionKey, QuestionRule};
use crate::services::QuestionOrder;
use pollscore_common::{AnswerSpec, Period, Session, SessionConfig};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::warn;

/// Mismatch between configuration and observed questions
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringWarning {
    /// Answer key longer than the number of questions asked
    ExtraAnswers {
        session: Period,
        used: usize,
        given: usize,
    },
    /// Answer key shorter than the number of questions asked
    MissingAnswers {
        session: Period,
        participation_only: usize,
    },
    /// Configured questions nobody answered
    UnansweredQuestions { session: Period, labels: Vec<String> },
    /// Answered questions missing from the configuration
    UnconfiguredQuestions {
        session: Period,
        labels: Vec<String>,
        participation: f64,
    },
}

impl fmt::Display for ScoringWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringWarning::ExtraAnswers {
                session,
                used,
                given,
            } => write!(
                f,
                "Session {}: only the first {} of {} configured answers correspond to questions asked",
                session, used, given
            ),
            ScoringWarning::MissingAnswers {
                session,
                participation_only,
            } => write!(
                f,
                "Session {}: last {} questions without configured answers score participation only",
                session, participation_only
            ),
            ScoringWarning::UnansweredQuestions { session, labels } => write!(
                f,
                "Session {}: configured questions without responses: {}",
                session,
                labels.join(", ")
            ),
            ScoringWarning::UnconfiguredQuestions {
                session,
                labels,
                participation,
            } => write!(
                f,
                "Session {}: questions without configuration score participation {}: {}",
                session,
                participation,
                labels.join(", ")
            ),
        }
    }
}

/// Rules for every question column, in column order
#[derive(Debug, Clone, Default)]
pub struct ScoringRules {
    rules: Vec<QuestionRule>,
    index: HashMap<QuestionKey, usize>,
    warnings: Vec<ScoringWarning>,
}

impl ScoringRules {
    pub fn rules(&self) -> &[QuestionRule] {
        &self.rules
    }

    pub fn get(&self, key: &QuestionKey) -> Option<&QuestionRule> {
        self.index.get(key).map(|&i| &self.rules[i])
    }

    pub fn warnings(&self) -> &[ScoringWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Resolves session configuration against observed questions
pub struct ScoringResolver {
    default_participation: f64,
}

impl ScoringResolver {
    /// `default_participation` scores questions absent from explicit configuration
    /// when the session carries no default of its own
    pub fn new(default_participation: f64) -> Self {
        Self {
            default_participation,
        }
    }

    /// Resolve rules for all sessions that received responses
    pub fn resolve(&self, sessions: &[Session], order: &QuestionOrder) -> Result<ScoringRules> {
        let mut scoring = ScoringRules::default();

        for session in sessions {
            let labels = order.labels(&session.period);
            if labels.is_empty() {
                continue;
            }
            let (rules, warnings) = self.resolve_session(session, &labels)?;
            for warning in &warnings {
                warn!("{}", warning);
            }
            for rule in rules {
                scoring.index.insert(rule.key().clone(), scoring.rules.len());
                scoring.rules.push(rule);
            }
            scoring.warnings.extend(warnings);
        }

        Ok(scoring)
    }

    /// Rules for one session's questions, given in asking order
    pub fn resolve_session(
        &self,
        session: &Session,
        labels: &[&str],
    ) -> Result<(Vec<QuestionRule>, Vec<ScoringWarning>)> {
        match &session.config {
            SessionConfig::AnswerKey {
                key,
                participation,
                correct,
            } => resolve_answer_key(session.period, labels, key, *participation, *correct),
            SessionConfig::Explicit {
                participation,
                questions,
            } => {
                let period = session.period;
                let fallback = participation.unwrap_or(self.default_participation);
                let observed: BTreeSet<&str> = labels.iter().copied().collect();
                let mut warnings = Vec::new();

                let unanswered: Vec<String> = questions
                    .keys()
                    .filter(|label| !observed.contains(label.as_str()))
                    .cloned()
                    .collect();
                if !unanswered.is_empty() {
                    warnings.push(ScoringWarning::UnansweredQuestions {
                        session: period,
                        labels: unanswered,
                    });
                }

                let mut unconfigured: Vec<String> = labels
                    .iter()
                    .filter(|label| !questions.contains_key(**label))
                    .map(|label| label.to_string())
                    .collect();
                unconfigured.sort();
                if !unconfigured.is_empty() {
                    warnings.push(ScoringWarning::UnconfiguredQuestions {
                        session: period,
                        labels: unconfigured,
                        participation: fallback,
                    });
                }

                let rules = labels
                    .iter()
                    .map(|label| {
                        let key = QuestionKey::new(period, *label);
                        match questions.get(*label) {
                            Some(spec) => QuestionRule::new(
                                key,
                                spec.participation,
                                spec.correct,
                                spec.answers
                                    .as_ref()
                                    .map(AnswerSpec::to_set)
                                    .unwrap_or_default(),
                            ),
                            None => Ok(QuestionRule::participation_only(key, fallback)),
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok((rules, warnings))
            }
        }
    }
}

/// Comma-separated key, one entry per question; each entry is a set of
/// single-character accepted answers and whitespace is ignored
fn resolve_answer_key(
    period: Period,
    labels: &[&str],
    key: &str,
    participation: f64,
    correct: f64,
) -> Result<(Vec<QuestionRule>, Vec<ScoringWarning>)> {
    let mut entries: Vec<&str> = key.split(',').collect();
    let mut warnings = Vec::new();

    if entries.len() > labels.len() {
        warnings.push(ScoringWarning::ExtraAnswers {
            session: period,
            used: labels.len(),
            given: entries.len(),
        });
        entries.truncate(labels.len());
    } else if entries.len() < labels.len() {
        warnings.push(ScoringWarning::MissingAnswers {
            session: period,
            participation_only: labels.len() - entries.len(),
        });
    }

    let mut rules = Vec::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        let key = QuestionKey::new(period, *label);
        let answers: BTreeSet<String> = entries
            .get(i)
            .map(|entry| {
                entry
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let rule = if answers.is_empty() {
            QuestionRule::participation_only(key, participation)
        } else {
            QuestionRule::new(key, participation, correct, answers)?
        };
        rules.push(rule);
    }

    Ok((rules, warnings))
}
