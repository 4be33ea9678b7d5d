//! Collected validation errors, addressable by row and field.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where an error belongs vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLocation {
    /// The header or the rule set as a whole.
    Header,
    /// A data row, zero-based (the header is not counted).
    Row(usize),
}

/// Where an error belongs within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSlot {
    /// Relates to the row's shape as defined by the header.
    Header,
    /// A concrete column.
    Field(usize),
    /// A whole-row message. Slots count down from -1 in insertion order.
    Whole(i64),
}

impl fmt::Display for RowLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLocation::Header => f.write_str("header"),
            RowLocation::Row(row) => write!(f, "row {}", row),
        }
    }
}

/// One stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub row: RowLocation,
    pub field: FieldSlot,
    pub message: String,
}

/// Error messages keyed by row, then by field slot.
///
/// Entries are only ever added. A message for a slot that is already taken
/// is appended to the existing text, so keys never move.
#[derive(Debug, Clone, Default)]
pub struct ErrorStore {
    rows: IndexMap<RowLocation, IndexMap<FieldSlot, String>>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message. `None` as field allocates the next whole-row slot.
    pub fn add(&mut self, message: impl Into<String>, row: RowLocation, field: Option<FieldSlot>) {
        let message = message.into();
        let slots = self.rows.entry(row).or_default();

        let slot = match field {
            Some(slot) => slot,
            None => {
                let lowest = slots
                    .keys()
                    .filter_map(|slot| match slot {
                        FieldSlot::Whole(n) => Some(*n),
                        _ => None,
                    })
                    .min()
                    .unwrap_or(0);
                FieldSlot::Whole(lowest.min(0) - 1)
            }
        };

        match slots.entry(slot) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str("; ");
                existing.push_str(&message);
            }
            Entry::Vacant(entry) => {
                entry.insert(message);
            }
        }
    }

    /// Record the same message at every (row, field) pair. An empty `fields`
    /// slice records one whole-row message per row.
    pub fn add_many(&mut self, message: &str, rows: &[RowLocation], fields: &[FieldSlot]) {
        for &row in rows {
            if fields.is_empty() {
                self.add(message, row, None);
            } else {
                for &field in fields {
                    self.add(message, row, Some(field));
                }
            }
        }
    }

    /// True if no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check for errors, optionally narrowed by row and/or field.
    pub fn has_error(&self, row: Option<RowLocation>, field: Option<FieldSlot>) -> bool {
        match (row, field) {
            (None, None) => !self.is_empty(),
            (Some(row), None) => self.rows.contains_key(&row),
            (Some(row), Some(field)) => self
                .rows
                .get(&row)
                .is_some_and(|slots| slots.contains_key(&field)),
            (None, Some(field)) => self.rows.values().any(|slots| slots.contains_key(&field)),
        }
    }

    /// The message stored at one exact location.
    pub fn get(&self, row: RowLocation, field: FieldSlot) -> Option<&str> {
        self.rows
            .get(&row)
            .and_then(|slots| slots.get(&field))
            .map(String::as_str)
    }

    /// All messages of one row, in insertion order.
    pub fn row_errors(&self, row: RowLocation) -> Option<&IndexMap<FieldSlot, String>> {
        self.rows.get(&row)
    }

    /// Records matching the optional row and field filters.
    pub fn records(&self, row: Option<RowLocation>, field: Option<FieldSlot>) -> Vec<ErrorRecord> {
        self.rows
            .iter()
            .filter(|(location, _)| row.is_none_or(|r| r == **location))
            .flat_map(|(location, slots)| {
                slots
                    .iter()
                    .filter(move |(slot, _)| field.is_none_or(|f| f == **slot))
                    .map(move |(slot, message)| ErrorRecord {
                        row: *location,
                        field: *slot,
                        message: message.clone(),
                    })
            })
            .collect()
    }

    /// Number of stored messages, in total or for one row.
    pub fn errors_count(&self, row: Option<RowLocation>) -> usize {
        match row {
            Some(row) => self.rows.get(&row).map_or(0, IndexMap::len),
            None => self.rows.values().map(IndexMap::len).sum(),
        }
    }

    /// Rows that have at least one error, in the order they were first hit.
    pub fn locations(&self) -> impl Iterator<Item = RowLocation> + '_ {
        self.rows.keys().copied()
    }

    /// All records as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records(None, None))?)
    }
}
