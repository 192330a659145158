//! Poll report reader
//!
//! Two layouts are recognized from the first line of the file:
//!
//! - **Legacy**: the first line is the response header
//!   `#,User Name,User Email,Submitted Date/Time,` and each row holds
//!   `#,name,email,time` followed by (question, answer) pairs.
//! - **Sectioned**: the first line is `Poll Report`, some introductory lines
//!   follow, then one or more sub-tables. Each sub-table starts with a header
//!   line whose last field is the question label; its rows hold
//!   `#,name,email,time,answer`.

use crate::error::{PollError, Result};
use crate::models::ResponseRecord;
use chrono::NaiveDateTime;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const REPORT_TITLE: &str = "Poll Report";
const HEADER_PREFIX: &str = "#,User Name,User Email,Submitted Date/Time";
const LEGACY_HEADER: &str = "#,User Name,User Email,Submitted Date/Time,";

const TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const EMAIL_FIELD: usize = 2;
const TIME_FIELD: usize = 3;
/// Sectioned layout answer; legacy layout first question
const ANSWER_FIELD: usize = 4;
const FIRST_QUESTION_FIELD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLayout {
    Legacy,
    Sectioned,
}

/// Reads poll report files into response records
#[derive(Debug, Default)]
pub struct PollReportReader;

impl PollReportReader {
    pub fn new() -> Self {
        Self
    }

    /// Read every file, in order
    ///
    /// # Errors
    /// [`PollError::NoReportFiles`] for an empty list, otherwise the first
    /// file that fails to read or parse.
    pub fn read_all(&self, paths: &[PathBuf]) -> Result<Vec<ResponseRecord>> {
        if paths.is_empty() {
            return Err(PollError::NoReportFiles);
        }
        let mut records = Vec::new();
        for path in paths {
            let file_records = self.read(path)?;
            info!(
                responses = file_records.len(),
                "Read poll report {}",
                path.display()
            );
            records.extend(file_records);
        }
        Ok(records)
    }

    pub fn read(&self, path: &Path) -> Result<Vec<ResponseRecord>> {
        let content = std::fs::read_to_string(path).map_err(|source| PollError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &content)
    }

    /// Parse report `content`; `path` is used in error messages only
    pub fn parse(&self, path: &Path, content: &str) -> Result<Vec<ResponseRecord>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let lines: Vec<&str> = content.lines().collect();

        match lines.first().map(|l| l.trim_end()) {
            Some(REPORT_TITLE) | Some(LEGACY_HEADER) => {}
            _ => return Err(PollError::UnrecognizedFormat(path.to_path_buf())),
        }

        let header = lines
            .iter()
            .position(|l| l.starts_with(HEADER_PREFIX))
            .ok_or_else(|| PollError::MissingHeader(path.to_path_buf()))?;

        let layout = if lines[header].trim_end() == LEGACY_HEADER {
            ReportLayout::Legacy
        } else {
            ReportLayout::Sectioned
        };
        debug!(layout = ?layout, "Poll report {}", path.display());

        match layout {
            ReportLayout::Legacy => self.parse_legacy(path, &lines, header),
            ReportLayout::Sectioned => self.parse_sectioned(path, &lines, header),
        }
    }

    fn parse_legacy(&self, path: &Path, lines: &[&str], header: usize) -> Result<Vec<ResponseRecord>> {
        let mut records = Vec::new();
        for (line, row) in parse_rows(path, &lines[header + 1..], header + 2)? {
            let (email, time) = participant(path, line, &row, FIRST_QUESTION_FIELD + 1)?;
            let fields: Vec<&str> = row.iter().skip(FIRST_QUESTION_FIELD).collect();
            for pair in fields.chunks(2) {
                let question = pair[0];
                if question.is_empty() {
                    continue;
                }
                let answer = pair.get(1).copied().unwrap_or_default();
                records.push(ResponseRecord::new(email.clone(), time, question, answer));
            }
        }
        Ok(records)
    }

    fn parse_sectioned(&self, path: &Path, lines: &[&str], header: usize) -> Result<Vec<ResponseRecord>> {
        let mut records = Vec::new();
        let mut start = header;
        while start < lines.len() {
            let question = question_label(path, lines[start], start + 1)?;
            let end = lines[start + 1..]
                .iter()
                .position(|l| l.starts_with(HEADER_PREFIX))
                .map(|offset| start + 1 + offset)
                .unwrap_or(lines.len());

            for (line, row) in parse_rows(path, &lines[start + 1..end], start + 2)? {
                let (email, time) = participant(path, line, &row, ANSWER_FIELD)?;
                let answer = row.get(ANSWER_FIELD).unwrap_or_default();
                records.push(ResponseRecord::new(email, time, question.as_str(), answer));
            }
            start = end;
        }
        Ok(records)
    }
}

/// Question label of a sub-table: the last field of its header line
fn question_label(path: &Path, line: &str, line_number: usize) -> Result<String> {
    let rows = parse_rows(path, &[line], line_number)?;
    Ok(rows
        .first()
        .and_then(|(_, record)| record.iter().last())
        .unwrap_or_default()
        .to_string())
}

/// Non-blank CSV rows of `lines` with their 1-based line numbers in the file
fn parse_rows(path: &Path, lines: &[&str], first_line: usize) -> Result<Vec<(usize, StringRecord)>> {
    let text = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| PollError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let offset = record.position().map(|p| p.line() as usize).unwrap_or(1);
        rows.push((first_line + offset - 1, record));
    }
    Ok(rows)
}

/// Lower-cased email and timestamp of a response row
fn participant(
    path: &Path,
    line: usize,
    row: &StringRecord,
    min_fields: usize,
) -> Result<(String, NaiveDateTime)> {
    let invalid = |message: String| PollError::InvalidRecord {
        path: path.to_path_buf(),
        line,
        message,
    };
    if row.len() < min_fields {
        return Err(invalid(format!(
            "expected at least {} fields, found {}",
            min_fields,
            row.len()
        )));
    }
    let email = row[EMAIL_FIELD].trim().to_lowercase();
    let time = parse_time(&row[TIME_FIELD])
        .ok_or_else(|| invalid(format!("unrecognized timestamp '{}'", &row[TIME_FIELD])))?;
    Ok((email, time))
}

pub(crate) fn parse_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Resolve glob patterns to files, each pattern's matches in sorted order
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matches = Vec::new();
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(path) => matches.push(path),
                Err(e) => warn!("Skipping {}: {}", e.path().display(), e.error()),
            }
        }
        if matches.is_empty() {
            warn!("No report files match pattern '{}'", pattern);
        }
        matches.sort();
        files.extend(matches);
    }
    Ok(files)
}
