//! Tabular records: the text content of a reconstructed table.

use std::fmt;

/// Rows of a record did not all have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaggedRows {
    /// Length of the first row.
    pub expected: usize,
    /// Index of the first row with a different length.
    pub row: usize,
    /// Length of that row.
    pub actual: usize,
}

impl fmt::Display for RaggedRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} has {} cells, expected {}",
            self.row, self.actual, self.expected
        )
    }
}

impl std::error::Error for RaggedRows {}

/// The text of one table, rectangular by construction.
///
/// When `header` is set, it holds the column labels taken from the first
/// extracted row and `rows` holds the remaining rows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRecord {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl TableRecord {
    /// Build a record from row-major cell text.
    ///
    /// With `first_row_header` and more than one row, the first row becomes
    /// the header. A single row always stays a data row.
    ///
    /// # Errors
    ///
    /// Returns [`RaggedRows`] if the rows differ in length.
    pub fn new(mut rows: Vec<Vec<String>>, first_row_header: bool) -> Result<Self, RaggedRows> {
        if let Some(first) = rows.first() {
            let expected = first.len();
            if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
                return Err(RaggedRows {
                    expected,
                    row,
                    actual: r.len(),
                });
            }
        }

        let header = if first_row_header && rows.len() > 1 {
            Some(rows.remove(0))
        } else {
            None
        };

        Ok(Self { header, rows })
    }

    /// Column labels, if the first row was promoted to a header.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Data rows (excluding the header).
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.header
            .as_ref()
            .or_else(|| self.rows.first())
            .map_or(0, Vec::len)
    }

    /// Number of data rows (excluding the header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header labels, or positional labels `"0"`, `"1"`, ... when the record
    /// has no header.
    pub fn column_labels(&self) -> Vec<String> {
        match &self.header {
            Some(header) => header.clone(),
            None => (0..self.column_count()).map(|i| i.to_string()).collect(),
        }
    }

    /// Look up a data cell by row index and column label.
    pub fn get(&self, row: usize, label: &str) -> Option<&str> {
        let column = self.header.as_ref()?.iter().position(|h| h == label)?;
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}
