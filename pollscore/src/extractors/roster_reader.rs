//! Roster reader
//!
//! Roster exports start with administrative rows (muted assignments, points
//! possible) before the participant rows. Everything up to and including the
//! row whose `Student` field reads "Points Possible" is dropped.

use crate::error::{PollError, Result};
use crate::models::roster::{column_index, NAME_COLUMN, POINTS_POSSIBLE};
use crate::models::Roster;
use std::path::Path;
use tracing::{debug, info};

pub struct RosterReader {
    id_column: String,
}

impl RosterReader {
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
        }
    }

    pub fn read(&self, path: &Path) -> Result<Roster> {
        info!("Reading roster from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| PollError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &content)
    }

    /// Parse roster `content`; `path` is used in error messages only
    pub fn parse(&self, path: &Path, content: &str) -> Result<Roster> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let csv_error = |source| PollError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(String::from)
            .collect();
        let name_column = column_index(&headers, NAME_COLUMN)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(record.iter().map(String::from).collect::<Vec<_>>());
        }

        let marker = rows
            .iter()
            .position(|row| {
                row.get(name_column)
                    .is_some_and(|name| name.trim() == POINTS_POSSIBLE)
            })
            .ok_or_else(|| PollError::MissingRosterMarker(path.to_path_buf()))?;
        rows.drain(..=marker);
        debug!(skipped = marker + 1, participants = rows.len(), "Roster rows");

        Roster::new(headers, rows, &self.id_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const ROSTER: &str = "Student,ID,SIS User ID,SIS Login ID,Section\n\
                          \"    Muted assignments\",,,,\n\
                          \"    Points Possible\",,,,\n\
                          \"Doe, Jane\",1,100,jd001,A\n\
                          \"Roe, Rick\",2,101,rr002,A\n";

    #[test]
    fn test_rows_before_marker_dropped() {
        let roster = RosterReader::new("SIS Login ID")
            .parse(&PathBuf::from("roster.csv"), ROSTER)
            .unwrap();
        assert_eq!(roster.rows().len(), 2);
        assert_eq!(roster.rows()[0][0], "Doe, Jane");
        assert!(roster.ids().contains("rr002"));
    }

    #[test]
    fn test_missing_marker() {
        let content = "Student,SIS Login ID\n\"Doe, Jane\",jd001\n";
        let err = RosterReader::new("SIS Login ID")
            .parse(&PathBuf::from("roster.csv"), content)
            .unwrap_err();
        assert!(matches!(err, PollError::MissingRosterMarker(_)));
    }

    #[test]
    fn test_configured_id_column_required() {
        let err = RosterReader::new("Login")
            .parse(&PathBuf::from("roster.csv"), ROSTER)
            .unwrap_err();
        assert!(matches!(err, PollError::MissingRosterColumn { ref column } if column == "Login"));
    }

    #[test]
    fn test_student_column_required() {
        let err = RosterReader::new("SIS Login ID")
            .parse(&PathBuf::from("roster.csv"), "Name,SIS Login ID\n")
            .unwrap_err();
        assert!(matches!(err, PollError::MissingRosterColumn { ref column } if column == "Student"));
    }
}
