//! TOML configuration file schema
//!
//! ```toml
//! domain = "@example.edu"
//! roster = "roster.csv"
//! upload = "upload.csv"
//! poll_reports = ["reports/*.csv"]
//! participation = 1
//! correct = 1
//! total_column = "Polls"
//!
//! [aliases]
//! "a.person@gmail.com" = "abc123"
//!
//! [[session]]
//! period = "2021-09-15 10:30; 90min"
//! answers = "A,BC,,D"
//!
//! [[session]]
//! period = "2021-09-17"
//!
//! [[session.question]]
//! label = "Which one?"
//! answers = ["A", "B"]
//! correct = 2
//! ```

use super::{AnswerSpec, PollConfig, PollConfigBuilder};
use crate::period::Period;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Patterns {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    domain: String,
    roster: Option<PathBuf>,
    upload: Option<PathBuf>,
    poll_reports: Option<Patterns>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
    #[serde(default)]
    ignore_responses: Vec<String>,
    #[serde(default)]
    ignore_roster: Vec<String>,
    #[serde(default)]
    participation: f64,
    #[serde(default)]
    correct: f64,
    participation_column: Option<String>,
    correctness_column: Option<String>,
    total_column: Option<String>,
    roster_id_column: Option<String>,
    #[serde(default)]
    include_unmatched_roster: bool,
    #[serde(default, rename = "session")]
    sessions: Vec<SessionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionEntry {
    period: String,
    length: Option<String>,
    answers: Option<String>,
    participation: Option<f64>,
    correct: Option<f64>,
    #[serde(default, rename = "question")]
    questions: Vec<QuestionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionEntry {
    label: String,
    answers: Option<AnswerSpec>,
    participation: Option<f64>,
    correct: Option<f64>,
}

pub(super) fn load(path: &Path) -> Result<PollConfig> {
    info!("Processing poll configuration from file \"{}\"", path.display());
    let content = std::fs::read_to_string(path)?;
    parse(&content).map_err(|e| match e {
        Error::Config(message) => Error::Config(format!("{}: {}", path.display(), message)),
        other => other,
    })
}

pub(super) fn parse(content: &str) -> Result<PollConfig> {
    let file: ConfigFile = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
    file.into_builder()?.build()
}

impl ConfigFile {
    /// Replay the file's declarations, in file order, onto a builder
    fn into_builder(self) -> Result<PollConfigBuilder> {
        let ConfigFile {
            domain,
            roster,
            upload,
            poll_reports,
            aliases,
            ignore_responses,
            ignore_roster,
            participation,
            correct,
            participation_column,
            correctness_column,
            total_column,
            roster_id_column,
            include_unmatched_roster,
            sessions,
        } = self;

        let mut builder = PollConfigBuilder::new();
        builder
            .domain(domain)
            .include_unmatched_roster(include_unmatched_roster);
        if let Some(path) = roster {
            builder.roster(path);
        }
        if let Some(path) = upload {
            builder.upload(path);
        }
        match poll_reports {
            Some(Patterns::One(pattern)) => {
                builder.poll_report(pattern);
            }
            Some(Patterns::Many(patterns)) => {
                for pattern in patterns {
                    builder.poll_report(pattern);
                }
            }
            None => {}
        }
        for (email, target) in aliases {
            builder.alias(email, target);
        }
        for email in ignore_responses {
            builder.ignore_response(email);
        }
        for id in ignore_roster {
            builder.ignore_roster(id);
        }
        if let Some(label) = participation_column {
            builder.participation_column(label);
        }
        if let Some(label) = correctness_column {
            builder.correctness_column(label);
        }
        if let Some(label) = total_column {
            builder.total_column(label);
        }
        if let Some(column) = roster_id_column {
            builder.roster_id_column(column);
        }

        for session in sessions {
            let period = Period::parse(&session.period, session.length.as_deref())?;
            builder
                .default_participation(session.participation.unwrap_or(participation))
                .default_correct(session.correct.unwrap_or(correct))
                .session(period, session.answers.as_deref());
            for question in session.questions {
                builder.question(
                    &question.label,
                    question.answers,
                    question.participation,
                    question.correct,
                )?;
            }
        }

        builder
            .default_participation(participation)
            .default_correct(correct);
        Ok(builder)
    }
}
