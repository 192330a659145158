//! Score table ready for upload

/// Roster rows extended with score columns, points-possible row first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SubmissionTable {
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Value of `header` in the first row whose column `key_header` equals `key`
    pub fn lookup(&self, key_header: &str, key: &str, header: &str) -> Option<&str> {
        let key_index = self.column(key_header)?;
        let index = self.column(header)?;
        self.rows
            .iter()
            .find(|row| row[key_index] == key)
            .map(|row| row[index].as_str())
    }
}
