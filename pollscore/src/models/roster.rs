//! Course roster
//!
//! Participant rows as exported by the course management system, after the
//! leading administrative rows have been removed by the reader.

use crate::error::{PollError, Result};
use std::collections::BTreeSet;

/// Label in the name column of the row holding maximum scores
pub const POINTS_POSSIBLE: &str = "Points Possible";

/// Roster column holding participant display names
pub const NAME_COLUMN: &str = "Student";

#[derive(Debug, Clone)]
pub struct Roster {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    id_column: usize,
}

impl Roster {
    /// Build a roster keyed by the `id_column` header
    ///
    /// Rows shorter than the header are padded with empty fields, longer rows
    /// are truncated.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, id_column: &str) -> Result<Self> {
        let id_column = column_index(&headers, id_column)?;
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Ok(Self {
            headers,
            rows,
            id_column,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of the display-name column, if present
    pub fn name_column(&self) -> Option<usize> {
        self.headers.iter().position(|h| h == NAME_COLUMN)
    }

    pub fn id_of<'a>(&self, row: &'a [String]) -> &'a str {
        row[self.id_column].trim()
    }

    /// Non-empty participant identifiers
    pub fn ids(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .map(|row| self.id_of(row))
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }
}

pub(crate) fn column_index(headers: &[String], column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| PollError::MissingRosterColumn {
            column: column.to_string(),
        })
}
