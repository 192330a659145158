//! Session assignment
//!
//! Every response belongs to exactly one session. Responses outside all
//! configured sessions get a synthesized whole-day session, created from the
//! earliest unassigned response onward; each synthesized day must still be
//! disjoint from every other session or the run fails.

use crate::error::Result;
use crate::models::{ResponseRecord, SessionResponses};
use pollscore_common::period::find_overlap;
use pollscore_common::{Error as CommonError, Period, Session};
use tracing::{debug, info};

/// Outcome of assigning responses to sessions
#[derive(Debug, Clone)]
pub struct SessionAssignment {
    groups: Vec<SessionResponses>,
    synthesized: Vec<Period>,
}

impl SessionAssignment {
    /// One group per session, configured and synthesized, in chronological
    /// order. Sessions without responses have empty groups.
    pub fn groups(&self) -> &[SessionResponses] {
        &self.groups
    }

    /// Day sessions created for out-of-session responses, in creation order
    pub fn synthesized(&self) -> &[Period] {
        &self.synthesized
    }

    pub fn into_groups(self) -> Vec<SessionResponses> {
        self.groups
    }
}

/// Assigns responses to configured sessions
pub struct SessionAssigner {
    sessions: Vec<Session>,
}

impl SessionAssigner {
    /// # Errors
    /// `OverlappingSessions` when two configured sessions share an instant.
    pub fn new(sessions: &[Session]) -> Result<Self> {
        let mut sessions = sessions.to_vec();
        sessions.sort_by_key(|s| s.period.start());
        verify_disjoint(&sessions)?;
        Ok(Self { sessions })
    }

    pub fn assign(&self, mut records: Vec<ResponseRecord>) -> Result<SessionAssignment> {
        records.sort_by_key(|r| r.time);

        let mut sessions = self.sessions.clone();
        let mut assigned: Vec<Option<Period>> = records
            .iter()
            .map(|r| {
                sessions
                    .iter()
                    .find(|s| s.period.contains(r.time))
                    .map(|s| s.period)
            })
            .collect();

        let mut synthesized = Vec::new();
        while let Some(time) = records
            .iter()
            .zip(&assigned)
            .find(|(_, slot)| slot.is_none())
            .map(|(r, _)| r.time)
        {
            let period = Period::day(time.date());
            info!("Found response outside session. Creating {}", period);

            sessions.push(Session::unconfigured(period));
            sessions.sort_by_key(|s| s.period.start());
            verify_disjoint(&sessions)?;

            for (record, slot) in records.iter().zip(assigned.iter_mut()) {
                if slot.is_none() && period.contains(record.time) {
                    *slot = Some(period);
                }
            }
            synthesized.push(period);
        }

        let mut groups: Vec<SessionResponses> = sessions
            .into_iter()
            .map(|session| SessionResponses {
                session,
                records: Vec::new(),
            })
            .collect();

        for (record, period) in records.into_iter().zip(assigned) {
            let Some(period) = period else { continue };
            if let Some(group) = groups.iter_mut().find(|g| g.session.period == period) {
                group.records.push(record);
            }
        }

        for group in &groups {
            debug!(
                session = %group.session.period,
                responses = group.records.len(),
                "Session assigned"
            );
        }

        Ok(SessionAssignment {
            groups,
            synthesized,
        })
    }
}

fn verify_disjoint(sessions: &[Session]) -> Result<()> {
    match find_overlap(sessions.iter().map(|s| &s.period)) {
        Some((earlier, later)) => Err(CommonError::OverlappingSessions {
            earlier: earlier.to_string(),
            later: later.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}
