//! Rule set and reader configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{FieldRef, HeaderOptions};

/// A format coercion applied to one column (or a group of columns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRule {
    pub field: FieldRef,
    /// Registry key, e.g. `"integer"` or `"date"`.
    pub format: String,
    /// Leave blank cells exactly as read instead of writing the null value.
    #[serde(default)]
    pub preserve_empty: bool,
}

/// Substitution for empty cells applied while reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyValue {
    pub field: FieldRef,
    pub value: String,
}

/// Options for loading and validating a table.
///
/// Every key has a default, so a JSON rule set only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Field delimiter (None = sniff from the data).
    pub delimiter: Option<char>,
    /// Quote character (None = sniff from the data).
    pub quote: Option<char>,
    /// Columns that must exist and be non-empty in every row.
    pub required: Vec<FieldRef>,
    /// Columns whose cells, when present, must not be empty.
    pub not_null: Vec<FieldRef>,
    /// Unique keys. A group is a composite key.
    pub unique: Vec<FieldRef>,
    /// Report a header error when a unique key column is missing.
    pub unique_must_exist: bool,
    /// Allowed header names (None = any name allowed).
    pub allowed: Option<Vec<String>>,
    /// Extra header name patterns accepted by the allowed check.
    pub allowed_regexp: Vec<String>,
    /// Format coercions, applied in order.
    pub format: Vec<FormatRule>,
    /// Written into blank cells of formatted columns.
    pub null_value: String,
    /// Treat blank lines as absent for the row checks.
    pub skip_empty_lines: bool,
    pub unique_field_names: bool,
    pub lower_field_names: bool,
    pub trim_field_names: bool,
    /// First line is a header.
    pub read_header: bool,
    pub empty_value: Vec<EmptyValue>,
    /// Compare every row's width with the header.
    pub check_fields_count: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: None,
            required: Vec::new(),
            not_null: Vec::new(),
            unique: Vec::new(),
            unique_must_exist: true,
            allowed: None,
            allowed_regexp: Vec::new(),
            format: Vec::new(),
            null_value: String::new(),
            skip_empty_lines: true,
            unique_field_names: true,
            lower_field_names: false,
            trim_field_names: true,
            read_header: true,
            empty_value: Vec::new(),
            check_fields_count: false,
        }
    }
}

impl Options {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = Some(quote);
        self
    }

    /// Add a required field.
    pub fn with_required(mut self, field: impl Into<FieldRef>) -> Self {
        self.required.push(field.into());
        self
    }

    /// Add a not-null field.
    pub fn with_not_null(mut self, field: impl Into<FieldRef>) -> Self {
        self.not_null.push(field.into());
        self
    }

    /// Add a unique key. Pass a group for a composite key.
    pub fn with_unique(mut self, field: impl Into<FieldRef>) -> Self {
        self.unique.push(field.into());
        self
    }

    pub fn with_unique_must_exist(mut self, must_exist: bool) -> Self {
        self.unique_must_exist = must_exist;
        self
    }

    /// Restrict header names to the given list.
    pub fn with_allowed<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_allowed_regexp(mut self, pattern: impl Into<String>) -> Self {
        self.allowed_regexp.push(pattern.into());
        self
    }

    /// Coerce a column with a registry format.
    pub fn with_format(mut self, field: impl Into<FieldRef>, format: impl Into<String>) -> Self {
        self.format.push(FormatRule {
            field: field.into(),
            format: format.into(),
            preserve_empty: false,
        });
        self
    }

    /// Like [`with_format`](Self::with_format) but blank cells keep their
    /// literal text.
    pub fn with_format_preserving_empty(
        mut self,
        field: impl Into<FieldRef>,
        format: impl Into<String>,
    ) -> Self {
        self.format.push(FormatRule {
            field: field.into(),
            format: format.into(),
            preserve_empty: true,
        });
        self
    }

    pub fn with_null_value(mut self, value: impl Into<String>) -> Self {
        self.null_value = value.into();
        self
    }

    /// Substitute `value` for empty cells of `field` while reading.
    pub fn with_empty_value(mut self, field: impl Into<FieldRef>, value: impl Into<String>) -> Self {
        self.empty_value.push(EmptyValue {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_skip_empty_lines(mut self, skip: bool) -> Self {
        self.skip_empty_lines = skip;
        self
    }

    pub fn with_unique_field_names(mut self, unique: bool) -> Self {
        self.unique_field_names = unique;
        self
    }

    pub fn with_lower_field_names(mut self, lower: bool) -> Self {
        self.lower_field_names = lower;
        self
    }

    pub fn with_trim_field_names(mut self, trim: bool) -> Self {
        self.trim_field_names = trim;
        self
    }

    pub fn with_read_header(mut self, read: bool) -> Self {
        self.read_header = read;
        self
    }

    pub fn with_check_fields_count(mut self, check: bool) -> Self {
        self.check_fields_count = check;
        self
    }

    /// Header normalization settings.
    pub fn header_options(&self) -> HeaderOptions {
        HeaderOptions {
            trim: self.trim_field_names,
            lower: self.lower_field_names,
            unique: self.unique_field_names,
        }
    }

    /// Whether the header width is the canonical column count.
    pub(crate) fn header_is_canonical(&self) -> bool {
        self.check_fields_count && self.read_header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.delimiter, None);
        assert_eq!(options.quote, None);
        assert!(options.allowed.is_none());
        assert!(options.skip_empty_lines);
        assert!(options.unique_field_names);
        assert!(!options.lower_field_names);
        assert!(options.trim_field_names);
        assert!(options.read_header);
        assert!(!options.check_fields_count);
        assert!(options.unique_must_exist);
    }

    #[test]
    fn test_builder() {
        let options = Options::new()
            .with_delimiter(';')
            .with_required("id")
            .with_unique(FieldRef::group(vec!["a", "b"]))
            .with_allowed(["id", "name"])
            .with_format("id", "integer")
            .with_format_preserving_empty("note", "string")
            .with_empty_value("city", "unknown");

        assert_eq!(options.delimiter, Some(';'));
        assert_eq!(options.required, vec![FieldRef::from("id")]);
        assert_eq!(
            options.allowed,
            Some(vec!["id".to_string(), "name".to_string()])
        );
        assert_eq!(options.format.len(), 2);
        assert!(!options.format[0].preserve_empty);
        assert!(options.format[1].preserve_empty);
        assert_eq!(options.empty_value[0].value, "unknown");
    }

    #[test]
    fn test_from_json_partial() {
        let json = r#"{
            "delimiter": ";",
            "required": ["id", 2],
            "unique": [["first", "last"]],
            "allowed": ["id", "first", "last"],
            "format": [{"field": "id", "format": "integer"}],
            "lower_field_names": true
        }"#;
        let options = Options::from_json(json).unwrap();

        assert_eq!(options.delimiter, Some(';'));
        assert_eq!(options.required[1], FieldRef::Index(2));
        assert_eq!(options.unique[0], FieldRef::group(vec!["first", "last"]));
        assert_eq!(options.format[0].format, "integer");
        assert!(options.lower_field_names);
        // untouched keys keep defaults
        assert!(options.read_header);
        assert!(options.trim_field_names);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(Options::from_json("{ not json").is_err());
    }
}
