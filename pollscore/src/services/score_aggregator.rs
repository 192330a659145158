//! Score aggregation
//!
//! Per-cell scores are derived from the response table and the resolved rules,
//! summed per participant and merged into the roster. The merged table starts
//! with a Points Possible row holding the maximum of every score column.

use crate::models::roster::POINTS_POSSIBLE;
use crate::models::{QuestionKey, QuestionRule, ResponseTable, Roster, SubmissionTable};
use crate::services::{IdentityMatch, ScoringRules};
use pollscore_common::PollConfig;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreKind {
    Participation,
    Correctness,
    Total,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 3] = [
        ScoreKind::Participation,
        ScoreKind::Correctness,
        ScoreKind::Total,
    ];

    pub fn score(self, rule: &QuestionRule, answer: Option<&str>) -> f64 {
        match self {
            ScoreKind::Participation => rule.participation_score(answer),
            ScoreKind::Correctness => rule.correctness_score(answer),
            ScoreKind::Total => rule.total_score(answer),
        }
    }

    /// Highest score a rule can award
    pub fn max(self, rule: &QuestionRule) -> f64 {
        match self {
            ScoreKind::Participation => rule.participation(),
            ScoreKind::Correctness => rule.correct(),
            ScoreKind::Total => rule.max_total(),
        }
    }

    /// Sum of maxima over all rules
    pub fn points_possible(self, rules: &ScoringRules) -> f64 {
        rules.rules().iter().map(|rule| self.max(rule)).sum()
    }
}

/// One participant-by-question grid of scores
#[derive(Debug, Clone)]
pub struct ScoreTable {
    kind: ScoreKind,
    columns: Vec<QuestionKey>,
    rows: BTreeMap<String, Vec<f64>>,
}

impl ScoreTable {
    pub fn build(kind: ScoreKind, responses: &ResponseTable, rules: &ScoringRules) -> Self {
        let columns = rules.rules().iter().map(|r| r.key().clone()).collect();
        let rows = responses
            .emails()
            .map(|email| {
                let scores = rules
                    .rules()
                    .iter()
                    .map(|rule| kind.score(rule, responses.answer(email, rule.key())))
                    .collect();
                (email.to_string(), scores)
            })
            .collect();
        Self {
            kind,
            columns,
            rows,
        }
    }

    pub fn kind(&self) -> ScoreKind {
        self.kind
    }

    pub fn columns(&self) -> &[QuestionKey] {
        &self.columns
    }

    pub fn row(&self, email: &str) -> Option<&[f64]> {
        self.rows.get(email).map(Vec::as_slice)
    }

    pub fn score(&self, email: &str, key: &QuestionKey) -> Option<f64> {
        let index = self.columns.iter().position(|c| c == key)?;
        self.row(email).map(|row| row[index])
    }

    /// Row sums per participant email
    pub fn sums(&self) -> BTreeMap<String, f64> {
        self.rows
            .iter()
            .map(|(email, row)| (email.clone(), row.iter().sum()))
            .collect()
    }
}

/// A produced output column
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreColumn {
    pub kind: ScoreKind,
    pub label: String,
}

impl ScoreColumn {
    /// Configured columns in participation, correctness, total order
    pub fn from_config(config: &PollConfig) -> Vec<ScoreColumn> {
        let labels = [
            &config.participation_column,
            &config.correctness_column,
            &config.total_column,
        ];
        ScoreKind::ALL
            .into_iter()
            .zip(labels)
            .filter_map(|(kind, label)| {
                label.as_ref().map(|label| ScoreColumn {
                    kind,
                    label: label.clone(),
                })
            })
            .collect()
    }
}

/// Merges score sums into roster rows
pub struct RosterMerger {
    columns: Vec<ScoreColumn>,
    include_unmatched: bool,
}

impl RosterMerger {
    pub fn new(columns: Vec<ScoreColumn>, include_unmatched: bool) -> Self {
        Self {
            columns,
            include_unmatched,
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(ScoreColumn::from_config(config), config.include_unmatched_roster)
    }

    pub fn columns(&self) -> &[ScoreColumn] {
        &self.columns
    }

    pub fn merge(
        &self,
        roster: &Roster,
        identity: &IdentityMatch,
        responses: &ResponseTable,
        rules: &ScoringRules,
    ) -> SubmissionTable {
        let totals: Vec<(BTreeMap<String, f64>, f64)> = self
            .columns
            .iter()
            .map(|column| {
                let sums = ScoreTable::build(column.kind, responses, rules).sums();
                (sums_by_id(sums, identity), column.kind.points_possible(rules))
            })
            .collect();

        let mut headers = roster.headers().to_vec();
        headers.extend(self.columns.iter().map(|c| c.label.clone()));

        let mut points = vec![String::new(); roster.headers().len()];
        if let Some(index) = roster.name_column() {
            points[index] = format!("   {}", POINTS_POSSIBLE);
        }
        points.extend(totals.iter().map(|(_, max)| format_score(*max)));

        let matched = identity.matched_ids();
        let mut rows: Vec<Vec<String>> = roster
            .rows()
            .iter()
            .filter(|row| {
                let id = roster.id_of(row);
                !id.is_empty() && (self.include_unmatched || matched.contains(id))
            })
            .map(|row| {
                let id = roster.id_of(row);
                let mut out = row.clone();
                out.extend(
                    totals
                        .iter()
                        .map(|(sums, _)| format_score(sums.get(id).copied().unwrap_or(0.0))),
                );
                out
            })
            .collect();
        rows.sort_by(|a, b| {
            a[0].cmp(&b[0])
                .then_with(|| roster.id_of(a).cmp(roster.id_of(b)))
        });

        let mut table_rows = Vec::with_capacity(rows.len() + 1);
        table_rows.push(points);
        table_rows.extend(rows);
        SubmissionTable {
            headers,
            rows: table_rows,
        }
    }
}

fn sums_by_id(sums: BTreeMap<String, f64>, identity: &IdentityMatch) -> BTreeMap<String, f64> {
    let mut by_id: BTreeMap<String, f64> = BTreeMap::new();
    for (email, sum) in sums {
        let Some(id) = identity.get(&email) else { continue };
        if by_id.contains_key(id) {
            debug!(id, email = %email, "Several response emails for one roster entry, adding scores");
        }
        *by_id.entry(id.to_string()).or_insert(0.0) += sum;
    }
    by_id
}

/// Plain number text: `3`, `2.5`
pub fn format_score(score: f64) -> String {
    format!("{}", score)
}
