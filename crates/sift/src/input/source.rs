//! Loaded table data and metadata about where it came from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::schema::Header;

/// Metadata about the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File the text was read from, if any.
    pub path: Option<PathBuf>,
    /// Delimiter used to split fields.
    pub delimiter: char,
    /// Quote character used by the tokenizer.
    pub quote: char,
    /// Whether a UTF-8 byte-order mark was stripped.
    pub had_bom: bool,
    /// Number of logical lines read, header included.
    pub line_count: usize,
}

/// Header plus data rows, with the source line of every row.
///
/// Rows are already reconciled to [`column_count`](Self::column_count)
/// cells. The width each row had before padding or truncation is kept so
/// checks can tell a missing cell from an empty one.
#[derive(Debug, Clone)]
pub struct DataTable {
    pub(crate) header: Header,
    pub(crate) header_line: Option<usize>,
    pub(crate) rows: Vec<Vec<String>>,
    pub(crate) line_numbers: Vec<usize>,
    pub(crate) source_widths: Vec<usize>,
}

impl DataTable {
    /// The processed header. Empty when no header line was read.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Source line of the header, if one was read.
    pub fn header_line(&self) -> Option<usize> {
        self.header_line
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Get the number of data rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    pub(crate) fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut String> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// 1-based source line of a data row.
    pub fn line_number(&self, row: usize) -> Option<usize> {
        self.line_numbers.get(row).copied()
    }

    pub fn line_numbers(&self) -> &[usize] {
        &self.line_numbers
    }

    /// Number of cells the row had in the source.
    pub fn source_width(&self, row: usize) -> Option<usize> {
        self.source_widths.get(row).copied()
    }

    /// Whether the cell existed in the source row (before padding).
    pub fn is_present(&self, row: usize, col: usize) -> bool {
        self.source_width(row).is_some_and(|width| col < width)
    }

    /// A blank source line: one cell, and that cell empty.
    pub fn is_blank(&self, row: usize) -> bool {
        self.source_width(row) == Some(1) && self.get(row, 0).is_some_and(str::is_empty)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }
}
