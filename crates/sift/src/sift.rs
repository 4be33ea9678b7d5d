//! Main Sift struct and public API.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Result, SiftError};
use crate::input::{Dialect, DataTable, SourceMetadata, TableReader, strip_bom};
use crate::options::Options;
use crate::schema::{FieldRef, FieldResolver};
use crate::validation::{ErrorRecord, ErrorStore, FieldSlot, FormatRegistry, RowLocation, ValidationEngine};

/// One row as an ordered `key → value` map.
pub type AssociativeRow = IndexMap<String, String>;

/// Options for [`Sift::associative_rows`].
///
/// Rows are addressed in the array view, where index 0 is the header when
/// one was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociativeOptions {
    /// Explicit keys. When unset, the row at `header_line` supplies them.
    pub keys: Option<Vec<String>>,
    /// Row used as keys. Defaults to 0 when `keys` is unset.
    pub header_line: Option<usize>,
    /// First row to emit. Defaults to the row after `header_line`, or 0.
    pub offset: Option<usize>,
}

impl AssociativeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_header_line(mut self, line: usize) -> Self {
        self.header_line = Some(line);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// A loaded and validated table.
///
/// Everything happens in the constructor: sniffing, reading, header
/// processing and every validation pass. Afterwards the table and its
/// errors are read-only.
#[derive(Debug, Clone)]
pub struct Sift {
    options: Options,
    source: SourceMetadata,
    table: DataTable,
    errors: ErrorStore,
}

impl Sift {
    /// Load and validate in-memory text.
    pub fn from_data(data: &str, options: Options) -> Result<Self> {
        Self::build(data, None, options)
    }

    /// Load and validate raw bytes. Invalid UTF-8 is replaced.
    pub fn from_bytes(data: &[u8], options: Options) -> Result<Self> {
        Self::build(&String::from_utf8_lossy(data), None, options)
    }

    /// Load and validate a file.
    pub fn from_file(path: impl AsRef<Path>, options: Options) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| SiftError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::build(&String::from_utf8_lossy(&bytes), Some(path), options)
    }

    fn build(data: &str, path: Option<&Path>, options: Options) -> Result<Self> {
        let (text, had_bom) = strip_bom(data);
        let dialect = Dialect::resolve(text, &options)?;
        let engine = ValidationEngine::from_options(&options, FormatRegistry::global())?;

        let mut errors = ErrorStore::new();
        let mut table = TableReader::new(dialect, &options).read(text, &mut errors)?;
        engine.validate(&mut table, &mut errors);

        let source = SourceMetadata {
            path: path.map(Path::to_path_buf),
            delimiter: dialect.delimiter as char,
            quote: dialect.quote as char,
            had_bom,
            line_count: table.row_count() + usize::from(table.header_line().is_some()),
        };

        tracing::debug!(
            rows = table.row_count(),
            columns = table.column_count(),
            errors = errors.errors_count(None),
            "table loaded"
        );

        Ok(Self {
            options,
            source,
            table,
            errors,
        })
    }

    /// The options the table was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn source(&self) -> &SourceMetadata {
        &self.source
    }

    /// The underlying table.
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    /// The full error store.
    pub fn error_store(&self) -> &ErrorStore {
        &self.errors
    }

    // ------------------------------------------------------------------
    // Table accessors
    // ------------------------------------------------------------------

    /// Processed header names.
    pub fn header(&self) -> &[String] {
        self.table.header().names()
    }

    /// A row of the array view used as a header.
    pub fn header_at(&self, line: usize) -> Option<&[String]> {
        self.row(line)
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Number of rows in the array view (header included).
    pub fn total_row_count(&self) -> usize {
        self.table.row_count() + usize::from(self.has_header_row())
    }

    /// A row of the array view: index 0 is the header when one was read.
    pub fn row(&self, index: usize) -> Option<&[String]> {
        if self.has_header_row() {
            match index {
                0 => Some(self.header()),
                n => self.table.row(n - 1),
            }
        } else {
            self.table.row(index)
        }
    }

    /// Array view rows from `offset`.
    pub fn rows(&self, offset: usize) -> Vec<&[String]> {
        (offset..self.total_row_count())
            .filter_map(|i| self.row(i))
            .collect()
    }

    /// One column of the array view from `offset`. `None` past the last column.
    pub fn column(&self, index: usize, offset: usize) -> Option<Vec<&str>> {
        if index >= self.column_count() {
            return None;
        }
        Some(
            self.rows(offset)
                .into_iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Rows as ordered maps. Rows are padded with `""` or truncated to the
    /// number of keys; a repeated key keeps the later value. Keys taken from
    /// a row of the array view include its padding cells, which all share
    /// the key `""`.
    pub fn associative_rows(&self, options: &AssociativeOptions) -> Vec<AssociativeRow> {
        let header_line = match (&options.keys, options.header_line) {
            (_, Some(line)) => Some(line),
            (None, None) => Some(0),
            (Some(_), None) => None,
        };
        let offset = options
            .offset
            .unwrap_or_else(|| header_line.map_or(0, |line| line + 1));

        let keys: Vec<String> = match &options.keys {
            Some(keys) => keys.clone(),
            None => header_line
                .and_then(|line| self.row(line))
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        };

        self.rows(offset)
            .into_iter()
            .map(|row| zip_row(&keys, row))
            .collect()
    }

    /// Header and data rows as owned vectors.
    pub fn as_array(&self) -> Vec<Vec<String>> {
        self.rows(0).into_iter().map(<[String]>::to_vec).collect()
    }

    /// Data rows keyed by `keys`, or by the header when `keys` is `None`.
    ///
    /// Header keys cover the named columns only; cells in padding columns
    /// past the header line are left out.
    pub fn as_associative(&self, keys: Option<&[String]>) -> Vec<AssociativeRow> {
        let keys = keys.unwrap_or_else(|| self.table.header().named());
        self.table.rows().iter().map(|row| zip_row(keys, row)).collect()
    }

    // ------------------------------------------------------------------
    // Error queries
    // ------------------------------------------------------------------

    /// Check for errors, optionally narrowed by row and/or field.
    ///
    /// A field that is not in the header never has errors.
    pub fn has_error(&self, row: Option<RowLocation>, field: Option<&FieldRef>) -> bool {
        match field {
            None => self.errors.has_error(row, None),
            Some(field) => self
                .field_slots(field)
                .into_iter()
                .any(|slot| self.errors.has_error(row, Some(slot))),
        }
    }

    /// Error records, optionally narrowed by row and/or field.
    pub fn errors(&self, row: Option<RowLocation>, field: Option<&FieldRef>) -> Vec<ErrorRecord> {
        match field {
            None => self.errors.records(row, None),
            Some(field) => self
                .field_slots(field)
                .into_iter()
                .flat_map(|slot| self.errors.records(row, Some(slot)))
                .collect(),
        }
    }

    /// The message at one row and field.
    pub fn error(&self, row: RowLocation, field: &FieldRef) -> Option<&str> {
        self.field_slots(field)
            .into_iter()
            .find_map(|slot| self.errors.get(row, slot))
    }

    /// Number of messages, in total or for one row.
    pub fn errors_count(&self, row: Option<RowLocation>) -> usize {
        self.errors.errors_count(row)
    }

    fn has_header_row(&self) -> bool {
        self.table.header_line().is_some()
    }

    fn field_slots(&self, field: &FieldRef) -> Vec<FieldSlot> {
        FieldResolver::new(self.table.header())
            .resolve(field)
            .indices()
            .into_iter()
            .flatten()
            .map(FieldSlot::Field)
            .collect()
    }
}

fn zip_row(keys: &[String], row: &[String]) -> AssociativeRow {
    keys.iter()
        .enumerate()
        .map(|(i, key)| (key.clone(), row.get(i).cloned().unwrap_or_default()))
        .collect()
}
