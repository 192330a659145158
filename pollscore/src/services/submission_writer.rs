//! Submission file output

use crate::error::{PollError, Result};
use crate::models::SubmissionTable;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes a [`SubmissionTable`] as CSV
#[derive(Debug, Default)]
pub struct SubmissionWriter;

impl SubmissionWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, table: &SubmissionTable, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|source| PollError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(table, file).map_err(|source| PollError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        info!(rows = table.rows.len(), "Wrote {}", path.display());
        Ok(())
    }

    pub fn write_to<W: Write>(&self, table: &SubmissionTable, writer: W) -> csv::Result<()> {
        let mut out = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        out.write_record(&table.headers)?;
        for row in &table.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }
}
