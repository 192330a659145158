//! Poll scoring pipeline
//!
//! [`Poll::new`] runs every stage once, in order, and keeps the results:
//!
//! 1. assign responses to sessions, synthesizing day sessions as needed
//! 2. infer question order and drop sessions that received no responses
//! 3. pivot responses into the response table
//! 4. resolve one scoring rule per question column
//! 5. match response emails to roster identifiers
//! 6. merge score sums into the roster

use crate::error::Result;
use crate::models::{QuestionKey, ResponseRecord, ResponseTable, Roster, SubmissionTable};
use crate::services::{
    IdentityMatch, IdentityMatcher, QuestionOrder, RosterMerger, ScoreKind, ScoreTable,
    ScoringResolver, ScoringRules, SessionAssigner,
};
use pollscore_common::{Period, PollConfig, Session};
use tracing::info;

/// Scored poll
#[derive(Debug, Clone)]
pub struct Poll {
    config: PollConfig,
    sessions: Vec<Session>,
    synthesized: Vec<Period>,
    dropped: Vec<Period>,
    question_order: QuestionOrder,
    responses: ResponseTable,
    rules: ScoringRules,
    identity: IdentityMatch,
    roster_table: SubmissionTable,
}

impl Poll {
    pub fn new(config: PollConfig, records: Vec<ResponseRecord>, roster: &Roster) -> Result<Self> {
        info!("Response processing");
        let assignment = SessionAssigner::new(&config.sessions)?.assign(records)?;
        let synthesized = assignment.synthesized().to_vec();

        let question_order = QuestionOrder::from_groups(assignment.groups());
        let mut dropped = Vec::new();
        let groups: Vec<_> = assignment
            .into_groups()
            .into_iter()
            .filter(|group| {
                let answered = question_order.contains(&group.session.period);
                if !answered {
                    info!(
                        "Dropping session {} because it registered no responses",
                        group.session.period
                    );
                    dropped.push(group.session.period);
                }
                answered
            })
            .collect();

        let columns: Vec<QuestionKey> = groups
            .iter()
            .flat_map(|group| {
                let period = group.session.period;
                question_order
                    .labels(&period)
                    .into_iter()
                    .map(move |label| QuestionKey::new(period, label))
            })
            .collect();
        let responses = ResponseTable::build(columns, &groups)?;
        let sessions: Vec<Session> = groups.into_iter().map(|g| g.session).collect();
        info!(
            sessions = sessions.len(),
            participants = responses.len(),
            questions = responses.columns().len(),
            "Responses tabulated"
        );

        info!("Scoring processing");
        let rules = ScoringResolver::new(config.default_participation)
            .resolve(&sessions, &question_order)?;

        info!("Roster matching");
        let identity =
            IdentityMatcher::from_config(&config).match_identities(responses.emails(), &roster.ids());
        let roster_table =
            RosterMerger::from_config(&config).merge(roster, &identity, &responses, &rules);

        Ok(Self {
            config,
            sessions,
            synthesized,
            dropped,
            question_order,
            responses,
            rules,
            identity,
            roster_table,
        })
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Sessions that received responses, in chronological order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Day sessions created for responses outside all configured sessions
    pub fn synthesized_sessions(&self) -> &[Period] {
        &self.synthesized
    }

    /// Sessions removed for lack of responses
    pub fn dropped_sessions(&self) -> &[Period] {
        &self.dropped
    }

    pub fn question_order(&self) -> &QuestionOrder {
        &self.question_order
    }

    pub fn responses(&self) -> &ResponseTable {
        &self.responses
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn identity(&self) -> &IdentityMatch {
        &self.identity
    }

    pub fn score_table(&self, kind: ScoreKind) -> ScoreTable {
        ScoreTable::build(kind, &self.responses, &self.rules)
    }

    pub fn points_possible(&self, kind: ScoreKind) -> f64 {
        kind.points_possible(&self.rules)
    }

    /// Configured output columns with their maximum scores
    pub fn maxima(&self) -> Vec<(String, f64)> {
        RosterMerger::from_config(&self.config)
            .columns()
            .iter()
            .map(|column| (column.label.clone(), self.points_possible(column.kind)))
            .collect()
    }

    /// Roster rows with score columns, Points Possible row first
    pub fn roster_table(&self) -> &SubmissionTable {
        &self.roster_table
    }
}
