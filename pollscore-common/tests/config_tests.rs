//! Integration tests for TOML configuration loading
//!
//! Covers:
//! - Full configuration file round trip into `PollConfig`
//! - Declaration errors surfaced from the file (question placement, overlaps, ambiguity)
//! - Missing and malformed files

use pollscore_common::config::{AnswerSpec, PollConfig, SessionConfig};
use pollscore_common::{Error, Period};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_full_configuration() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
domain = "@example.edu"
roster = "roster.csv"
upload = "upload.csv"
poll_reports = ["reports/*.csv", "extra/*.csv"]
participation = 1
correct = 2
participation_column = "Poll participation"
total_column = "Poll total"
ignore_responses = ["TA@example.edu"]
ignore_roster = ["ta001"]

[aliases]
"a.person@gmail.com" = "abc123"

[[session]]
period = "2021-09-15 10:30; 90min"
answers = "A,BC,,D"

[[session]]
period = "2021-09-17 10:30"
length = "90min"

[[session.question]]
label = "Which one?"
answers = ["A", "B"]

[[session.question]]
label = "Opinion"
"#,
    );

    let config = PollConfig::load(&path).unwrap();

    assert_eq!(config.domain, "@example.edu");
    assert_eq!(config.roster, Some(PathBuf::from("roster.csv")));
    assert_eq!(config.upload, Some(PathBuf::from("upload.csv")));
    assert_eq!(config.poll_reports, vec!["reports/*.csv", "extra/*.csv"]);
    assert_eq!(config.participation_column.as_deref(), Some("Poll participation"));
    assert_eq!(config.correctness_column, None);
    assert_eq!(config.total_column.as_deref(), Some("Poll total"));
    assert_eq!(config.roster_id_column, "SIS Login ID");
    assert!(config.ignore_responses.contains("ta@example.edu"));
    assert!(config.ignore_roster.contains("ta001"));
    assert_eq!(config.aliases["a.person@gmail.com"], "abc123@example.edu");
    assert_eq!(config.default_participation, 1.0);
    assert_eq!(config.default_correct, 2.0);

    assert_eq!(config.sessions.len(), 2);
    assert_eq!(
        config.sessions[0].period,
        "2021-09-15 10:30; 90min".parse::<Period>().unwrap()
    );
    assert_eq!(
        config.sessions[0].config,
        SessionConfig::AnswerKey {
            key: "A,BC,,D".to_string(),
            participation: 1.0,
            correct: 2.0,
        }
    );

    let SessionConfig::Explicit { questions, .. } = &config.sessions[1].config else {
        panic!("second session should use the explicit form");
    };
    assert_eq!(
        questions["Which one?"].answers,
        Some(AnswerSpec::Many(vec!["A".to_string(), "B".to_string()]))
    );
    assert_eq!(questions["Which one?"].correct, 2.0);
    assert_eq!(questions["Opinion"].correct, 0.0);
    assert_eq!(questions["Opinion"].participation, 1.0);
}

#[test]
fn test_single_report_pattern_accepted() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "poll_reports = \"reports/*.csv\"\n");
    let config = PollConfig::load(&path).unwrap();
    assert_eq!(config.poll_reports, vec!["reports/*.csv"]);
}

#[test]
fn test_question_with_answer_key_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[[session]]
period = "2021-09-15"
answers = "A"

[[session.question]]
label = "Q1"
answers = "B"
"#,
    );
    assert!(matches!(
        PollConfig::load(&path),
        Err(Error::AnswerListFixed { .. })
    ));
}

#[test]
fn test_overlapping_sessions_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[[session]]
period = "2021-09-15"

[[session]]
period = "2021-09-15 10:00; H"
"#,
    );
    assert!(matches!(
        PollConfig::load(&path),
        Err(Error::OverlappingSessions { .. })
    ));
}

#[test]
fn test_ambiguous_session_length_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[[session]]
period = "2021-09-15 10:00; H"
length = "2H"
"#,
    );
    assert!(matches!(
        PollConfig::load(&path),
        Err(Error::AmbiguousPeriod(_))
    ));
}

#[test]
fn test_correct_score_without_answers_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[[session]]
period = "2021-09-15"

[[session.question]]
label = "Q1"
correct = 1
"#,
    );
    assert!(matches!(
        PollConfig::load(&path),
        Err(Error::InvalidRule { .. })
    ));
}

#[test]
fn test_malformed_toml_reports_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "domain = \n");
    match PollConfig::load(&path) {
        Err(Error::Config(message)) => assert!(message.contains("config")),
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = PollConfig::load(&dir.path().join("does-not-exist"));
    assert!(matches!(result, Err(Error::Io(_))));
}
