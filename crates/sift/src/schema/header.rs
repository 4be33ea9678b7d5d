//! Header normalization and the name → position map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::validation::{ErrorStore, RowLocation};

/// How header cells are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderOptions {
    /// Trim surrounding whitespace from names.
    pub trim: bool,
    /// Lowercase names (applied after trimming).
    pub lower: bool,
    /// Report duplicate names as a header error.
    pub unique: bool,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            trim: true,
            lower: false,
            unique: true,
        }
    }
}

/// A processed header row.
#[derive(Debug, Clone, Default)]
pub struct Header {
    names: Vec<String>,
    /// Columns taken from the header line; the rest is padding.
    named: usize,
    positions: IndexMap<String, usize>,
    options: HeaderOptions,
}

impl Header {
    /// A header with no columns, used when no header line is read.
    pub fn empty(options: HeaderOptions) -> Self {
        Self {
            names: Vec::new(),
            named: 0,
            positions: IndexMap::new(),
            options,
        }
    }

    /// Normalize the raw header cells and build the reverse map.
    ///
    /// `None` means the input had no lines at all; that is recorded as a
    /// header error and an empty header is returned.
    pub fn process(
        raw: Option<Vec<String>>,
        options: &HeaderOptions,
        errors: &mut ErrorStore,
    ) -> Self {
        let Some(raw) = raw else {
            tracing::warn!("no header line, input is empty");
            errors.add("file is empty", RowLocation::Header, None);
            return Self::empty(*options);
        };

        let mut header = Self::empty(*options);
        let names: Vec<String> = raw.iter().map(|name| header.normalize(name)).collect();
        header.named = names.len();
        header.names = names;

        // First occurrence wins for lookups.
        for (position, name) in header.names.iter().enumerate() {
            header.positions.entry(name.clone()).or_insert(position);
        }

        if options.unique && header.positions.len() < header.names.len() {
            let duplicates = header.duplicate_names();
            tracing::warn!(?duplicates, "duplicate field names in header");
            errors.add(
                format!("duplicate field names: {}", duplicates.join(", ")),
                RowLocation::Header,
                None,
            );
        }

        header
    }

    /// Apply the configured trim/lower rules to a name.
    pub fn normalize(&self, name: &str) -> String {
        let name = if self.options.trim { name.trim() } else { name };
        if self.options.lower {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Position of a column by name, after normalizing the name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(&self.normalize(name)).copied()
    }

    /// Normalized names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns that came from the header line, padding excluded.
    pub fn named_len(&self) -> usize {
        self.named
    }

    /// Names of the columns that came from the header line.
    pub fn named(&self) -> &[String] {
        &self.names[..self.named]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Pad with unnamed columns. Padding is not visible to name lookups.
    pub(crate) fn pad_to(&mut self, width: usize) {
        if self.names.len() < width {
            self.names.resize(width, String::new());
        }
    }

    /// Names seen more than once, each listed once, in order of appearance.
    fn duplicate_names(&self) -> Vec<String> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for name in &self.names {
            *counts.entry(name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}
