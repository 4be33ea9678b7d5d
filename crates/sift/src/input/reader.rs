//! Reads delimited text into a [`DataTable`].

use crate::error::{Result, SiftError};
use crate::options::Options;
use crate::schema::{FieldResolver, Header};
use crate::validation::ErrorStore;

use super::sniffer::Dialect;
use super::source::DataTable;

/// UTF-8 byte-order mark.
const BOM: char = '\u{feff}';

/// Strip a leading byte-order mark. Returns the text and whether one was found.
pub fn strip_bom(text: &str) -> (&str, bool) {
    match text.strip_prefix(BOM) {
        Some(rest) => (rest, true),
        None => (text, false),
    }
}

/// One tokenized line and the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Drives the tokenizer over the whole input and reconciles row widths.
pub struct TableReader<'a> {
    dialect: Dialect,
    options: &'a Options,
}

impl<'a> TableReader<'a> {
    pub fn new(dialect: Dialect, options: &'a Options) -> Self {
        Self { dialect, options }
    }

    /// Tokenize every logical line of `text`.
    ///
    /// Blank lines are kept as a single empty cell. A final line break does
    /// not start another row.
    pub fn read_rows(&self, text: &str) -> Result<Vec<RawRow>> {
        split_lines(text, self.dialect)
            .into_iter()
            .map(|(line, content)| {
                Ok(RawRow {
                    line,
                    cells: tokenize_line(content, line, self.dialect)?,
                })
            })
            .collect()
    }

    /// Read `text` into a table. Header problems go to `errors`.
    pub fn read(&self, text: &str, errors: &mut ErrorStore) -> Result<DataTable> {
        let mut raw_rows = self.read_rows(text)?.into_iter();

        let header_options = self.options.header_options();
        let (mut header, header_line) = if self.options.read_header {
            let first = raw_rows.next();
            let header_line = first.as_ref().map(|row| row.line);
            (
                Header::process(first.map(|row| row.cells), &header_options, errors),
                header_line,
            )
        } else {
            (Header::empty(header_options), None)
        };

        let substitutions = self.empty_value_columns(&header);

        let mut rows = Vec::new();
        let mut line_numbers = Vec::new();
        let mut source_widths = Vec::new();
        for RawRow { line, mut cells } in raw_rows {
            let blank = cells.len() == 1 && cells[0].is_empty();
            if !blank {
                for (col, value) in &substitutions {
                    if let Some(cell) = cells.get_mut(*col) {
                        if cell.is_empty() {
                            cell.clone_from(value);
                        }
                    }
                }
            }
            source_widths.push(cells.len());
            line_numbers.push(line);
            rows.push(cells);
        }

        // Header width is canonical only when rows are checked against it.
        let width = if self.options.header_is_canonical() {
            header.len()
        } else {
            rows.iter()
                .map(Vec::len)
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        };
        header.pad_to(width);
        for row in &mut rows {
            row.resize(width, String::new());
        }

        tracing::debug!(
            columns = width,
            rows = rows.len(),
            header = self.options.read_header,
            "read table"
        );

        Ok(DataTable {
            header,
            header_line,
            rows,
            line_numbers,
            source_widths,
        })
    }

    /// Resolved (column, value) pairs for empty-value substitution.
    fn empty_value_columns(&self, header: &Header) -> Vec<(usize, String)> {
        let resolver = FieldResolver::new(header);
        self.options
            .empty_value
            .iter()
            .flat_map(|rule| {
                resolver
                    .resolve(&rule.field)
                    .indices()
                    .into_iter()
                    .flatten()
                    .map(|col| (col, rule.value.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Split text into logical lines, keeping quoted line breaks inside their
/// line. A `\r` right before a line break is dropped.
///
/// A quote only opens a quoted field as the first byte of a field; anywhere
/// else it is a literal character, as it is for the tokenizer.
fn split_lines(text: &str, dialect: Dialect) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut start = 0;
    let mut start_line = 1;
    let mut line = 1;

    let mut pos = 0;
    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte == b'\n' {
            line += 1;
        }

        if in_quotes {
            if byte == dialect.quote {
                if bytes.get(pos + 1) == Some(&dialect.quote) {
                    // escaped quote
                    pos += 1;
                } else {
                    in_quotes = false;
                }
            }
        } else if byte == b'\n' {
            let end = if pos > start && bytes[pos - 1] == b'\r' { pos - 1 } else { pos };
            lines.push((start_line, &text[start..end]));
            start = pos + 1;
            start_line = line;
            field_start = true;
        } else if byte == dialect.delimiter {
            field_start = true;
        } else {
            in_quotes = field_start && byte == dialect.quote;
            field_start = false;
        }
        pos += 1;
    }

    if start < bytes.len() {
        lines.push((start_line, &text[start..]));
    }

    lines
}

/// Split one logical line into fields with the csv tokenizer.
///
/// The line holds exactly one record; anything the tokenizer reads past the
/// first record is reported instead of dropped.
fn tokenize_line(content: &str, line: usize, dialect: Dialect) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut record = csv::StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|source| SiftError::Csv { line, source })?;
    if !found {
        return Ok(vec![String::new()]);
    }

    let cells = record.iter().map(|s| s.to_string()).collect();
    let more = reader
        .read_record(&mut record)
        .map_err(|source| SiftError::Csv { line, source })?;
    if more {
        return Err(SiftError::SplitRecord { line });
    }

    Ok(cells)
}
