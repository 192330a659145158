//! Scoring rule for a single question

use crate::error::{PollError, Result};
use crate::models::QuestionKey;
use std::collections::BTreeSet;

/// How one (session, question) column is scored
///
/// An empty answer counts as no answer at all: it earns neither participation
/// nor correctness points.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRule {
    key: QuestionKey,
    participation: f64,
    correct: f64,
    answers: BTreeSet<String>,
}

impl QuestionRule {
    /// # Errors
    /// [`PollError::InvalidRule`] for a positive correctness score with no
    /// accepted answers.
    pub fn new(
        key: QuestionKey,
        participation: f64,
        correct: f64,
        answers: BTreeSet<String>,
    ) -> Result<Self> {
        if correct > 0.0 && answers.is_empty() {
            return Err(PollError::InvalidRule {
                session: key.session,
                label: key.label,
            });
        }
        Ok(Self {
            key,
            participation,
            correct,
            answers,
        })
    }

    /// Rule awarding participation only
    pub fn participation_only(key: QuestionKey, participation: f64) -> Self {
        Self {
            key,
            participation,
            correct: 0.0,
            answers: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> &QuestionKey {
        &self.key
    }

    pub fn participation(&self) -> f64 {
        self.participation
    }

    pub fn correct(&self) -> f64 {
        self.correct
    }

    pub fn answers(&self) -> &BTreeSet<String> {
        &self.answers
    }

    pub fn participation_score(&self, answer: Option<&str>) -> f64 {
        match given(answer) {
            Some(_) => self.participation,
            None => 0.0,
        }
    }

    pub fn correctness_score(&self, answer: Option<&str>) -> f64 {
        match given(answer) {
            Some(answer) if self.answers.contains(answer) => self.correct,
            _ => 0.0,
        }
    }

    pub fn total_score(&self, answer: Option<&str>) -> f64 {
        self.participation_score(answer) + self.correctness_score(answer)
    }

    /// Highest total score attainable
    pub fn max_total(&self) -> f64 {
        self.participation + self.correct
    }
}

fn given(answer: Option<&str>) -> Option<&str> {
    answer.filter(|a| !a.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollscore_common::Period;

    fn key() -> QuestionKey {
        QuestionKey::new("2021-09-15".parse::<Period>().unwrap(), "Q1")
    }

    fn answers(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scores_for_correct_wrong_and_missing() {
        let rule = QuestionRule::new(key(), 1.0, 2.0, answers(&["A", "B"])).unwrap();

        assert_eq!(rule.participation_score(Some("A")), 1.0);
        assert_eq!(rule.correctness_score(Some("A")), 2.0);
        assert_eq!(rule.total_score(Some("B")), 3.0);

        assert_eq!(rule.participation_score(Some("C")), 1.0);
        assert_eq!(rule.correctness_score(Some("C")), 0.0);
        assert_eq!(rule.total_score(Some("C")), 1.0);

        for missing in [None, Some("")] {
            assert_eq!(rule.participation_score(missing), 0.0);
            assert_eq!(rule.correctness_score(missing), 0.0);
            assert_eq!(rule.total_score(missing), 0.0);
        }
        assert_eq!(rule.max_total(), 3.0);
    }

    #[test]
    fn test_empty_string_never_correct() {
        let rule = QuestionRule::new(key(), 1.0, 1.0, answers(&[""])).unwrap();
        assert_eq!(rule.correctness_score(Some("")), 0.0);
    }

    #[test]
    fn test_answers_are_case_sensitive() {
        let rule = QuestionRule::new(key(), 0.0, 1.0, answers(&["A"])).unwrap();
        assert_eq!(rule.correctness_score(Some("a")), 0.0);
    }

    #[test]
    fn test_correct_score_requires_answers() {
        let err = QuestionRule::new(key(), 1.0, 1.0, BTreeSet::new()).unwrap_err();
        assert!(matches!(err, PollError::InvalidRule { ref label, .. } if label == "Q1"));

        let rule = QuestionRule::new(key(), 1.0, 0.0, BTreeSet::new()).unwrap();
        assert_eq!(rule.total_score(Some("anything")), 1.0);
    }
}
