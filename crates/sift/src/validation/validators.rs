//! Rule checks run over a loaded table.
//!
//! Each check is a [`Validator`]. The [`ValidationEngine`] runs them in a
//! fixed order; none of them short-circuits the others.

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Result, SiftError};
use crate::input::DataTable;
use crate::options::{FormatRule, Options};
use crate::schema::{FieldRef, FieldResolver};

use super::errors::{ErrorStore, FieldSlot, RowLocation};
use super::formats::FormatRegistry;

/// Trait for validators.
pub trait Validator {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Run the check, recording problems in `errors`. Format checks may
    /// rewrite cells.
    fn validate(&self, table: &mut DataTable, errors: &mut ErrorStore);
}

/// Rows that the row-level checks look at.
fn checked_rows(table: &DataTable, skip_empty_lines: bool) -> Vec<usize> {
    (0..table.row_count())
        .filter(|&row| !(skip_empty_lines && table.is_blank(row)))
        .collect()
}

/// Record a header error for every leaf of `field` that does not resolve.
/// Returns the resolved column indices.
fn resolve_or_report(table: &DataTable, field: &FieldRef, errors: &mut ErrorStore) -> Vec<usize> {
    let resolver = FieldResolver::new(table.header());
    let mut columns = Vec::new();
    for leaf in field.leaves() {
        match resolver.resolve(leaf).index() {
            Some(col) => columns.push(col),
            None => errors.add(format!("field missing: {}", leaf), RowLocation::Header, None),
        }
    }
    columns
}

// ============================================================================
// Field Count
// ============================================================================

/// Compares every row's source width with the header width.
pub struct FieldCountValidator {
    pub skip_empty_lines: bool,
}

impl Validator for FieldCountValidator {
    fn name(&self) -> &'static str {
        "field_count"
    }

    fn validate(&self, table: &mut DataTable, errors: &mut ErrorStore) {
        let expected = table.column_count();
        for row in checked_rows(table, self.skip_empty_lines) {
            let found = table.source_width(row).unwrap_or(0);
            if found != expected {
                errors.add(
                    format!("expected {} fields, found {}", expected, found),
                    RowLocation::Row(row),
                    Some(FieldSlot::Header),
                );
            }
        }
    }
}

// ============================================================================
// Required / Not Null
// ============================================================================

/// Fields that must exist and be non-empty in every row.
pub struct RequiredValidator {
    pub fields: Vec<FieldRef>,
    pub skip_empty_lines: bool,
}

impl Validator for RequiredValidator {
    fn name(&self) -> &'static str {
        "required"
    }

    fn validate(&self, table: &mut DataTable, errors: &mut ErrorStore) {
        let rows = checked_rows(table, self.skip_empty_lines);
        for field in &self.fields {
            for col in resolve_or_report(table, field, errors) {
                for &row in &rows {
                    let filled = table.is_present(row, col)
                        && table.get(row, col).is_some_and(|cell| !cell.is_empty());
                    if !filled {
                        errors.add(
                            "field is required",
                            RowLocation::Row(row),
                            Some(FieldSlot::Field(col)),
                        );
                    }
                }
            }
        }
    }
}

/// Fields that may be missing from a row but must not be empty when present.
pub struct NotNullValidator {
    pub fields: Vec<FieldRef>,
    pub skip_empty_lines: bool,
}

impl Validator for NotNullValidator {
    fn name(&self) -> &'static str {
        "not_null"
    }

    fn validate(&self, table: &mut DataTable, errors: &mut ErrorStore) {
        let rows = checked_rows(table, self.skip_empty_lines);
        for field in &self.fields {
            for col in resolve_or_report(table, field, errors) {
                for &row in &rows {
                    if table.is_present(row, col) && table.get(row, col) == Some("") {
                        errors.add(
                            "field must not be empty",
                            RowLocation::Row(row),
                            Some(FieldSlot::Field(col)),
                        );
                    }
                }
            }
        }
    }
}

// ============================================================================
// Allowed Fields
// ============================================================================

/// Header names must be in the allow-list or match one of the patterns.
pub struct AllowedFieldsValidator {
    pub allowed: Vec<String>,
    pub patterns: Vec<Regex>,
}

impl Validator for AllowedFieldsValidator {
    fn name(&self) -> &'static str {
        "allowed"
    }

    fn validate(&self, table: &mut DataTable, errors: &mut ErrorStore) {
        let header = table.header();
        let allowed: Vec<String> = self.allowed.iter().map(|n| header.normalize(n)).collect();

        let mut unexpected: Vec<&str> = Vec::new();
        // padding columns past the header line are not names
        for name in header.names().iter().take(header.named_len()) {
            if unexpected.contains(&name.as_str()) {
                continue;
            }
            if allowed.contains(name) || self.patterns.iter().any(|p| p.is_match(name)) {
                continue;
            }
            unexpected.push(name);
        }

        if !unexpected.is_empty() {
            tracing::warn!(?unexpected, "header has fields outside the allow-list");
            let listed: Vec<String> = unexpected
                .iter()
                .map(|name| if name.is_empty() { "\"\"".to_string() } else { name.to_string() })
                .collect();
            errors.add(
                format!("unexpected fields: {}", listed.join(", ")),
                RowLocation::Header,
                None,
            );
        }
    }
}

// ============================================================================
// Format Coercion
// ============================================================================

/// Converts cells with registry formats, in rule order.
///
/// Blank cells are set to the null value and not converted. A failed
/// conversion leaves the cell as it was.
pub struct FormatValidator<'r> {
    pub rules: Vec<FormatRule>,
    pub registry: &'r FormatRegistry,
    pub null_value: String,
    pub skip_empty_lines: bool,
}

impl Validator for FormatValidator<'_> {
    fn name(&self) -> &'static str {
        "format"
    }

    fn validate(&self, table: &mut DataTable, errors: &mut ErrorStore) {
        let rows = checked_rows(table, self.skip_empty_lines);

        for rule in &self.rules {
            let Some(coercion) = self.registry.get(&rule.format) else {
                // keys are checked when the engine is built
                continue;
            };

            let resolved = FieldResolver::new(table.header()).resolve(&rule.field);
            let columns: Vec<usize> = resolved.indices().into_iter().flatten().collect();
            if !resolved.is_complete() {
                tracing::debug!(field = %rule.field, "format field not in header");
            }

            for col in columns {
                for &row in &rows {
                    if !table.is_present(row, col) {
                        continue;
                    }
                    let Some(cell) = table.get_mut(row, col) else {
                        continue;
                    };

                    let value = cell.trim();
                    if value.is_empty() {
                        if !rule.preserve_empty {
                            cell.clone_from(&self.null_value);
                        }
                        continue;
                    }

                    match coercion.apply(value) {
                        Ok(converted) => *cell = converted,
                        Err(_) => errors.add(
                            format!("invalid {} value '{}'", rule.format, cell),
                            RowLocation::Row(row),
                            Some(FieldSlot::Field(col)),
                        ),
                    }
                }
            }
        }
    }
}

// ============================================================================
// Uniqueness
// ============================================================================

/// Single-column and composite unique keys.
///
/// Rows with equal key cells are duplicates, empty cells included.
pub struct UniquenessValidator {
    pub keys: Vec<FieldRef>,
    /// Report and skip a key whose columns are not all in the header.
    pub must_exist: bool,
    pub skip_empty_lines: bool,
}

impl UniquenessValidator {
    fn check_key(&self, table: &DataTable, key: &FieldRef, errors: &mut ErrorStore) {
        let resolver = FieldResolver::new(table.header());
        let missing = resolver.missing(key);
        if self.must_exist && !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|f| f.to_string()).collect();
            errors.add(
                format!("field missing: {}", names.join(", ")),
                RowLocation::Header,
                None,
            );
            return;
        }

        let columns = resolver.resolve(key).indices();

        // grouped on the cells, never on a joined string
        let mut groups: IndexMap<Vec<&str>, Vec<usize>> = IndexMap::new();
        for row in checked_rows(table, self.skip_empty_lines) {
            let values: Vec<&str> = columns
                .iter()
                .map(|col| col.and_then(|c| table.get(row, c)).unwrap_or(""))
                .collect();
            groups.entry(values).or_default().push(row);
        }

        let fields: Vec<FieldSlot> = columns.iter().flatten().map(|&c| FieldSlot::Field(c)).collect();
        for (values, rows) in groups.iter().filter(|(_, rows)| rows.len() > 1) {
            let lines: Vec<String> = rows
                .iter()
                .filter_map(|&row| table.line_number(row))
                .map(|line| line.to_string())
                .collect();
            let message = format!(
                "duplicate value '{}' on lines {}",
                values.join(", "),
                lines.join(", ")
            );
            let locations: Vec<RowLocation> = rows.iter().map(|&r| RowLocation::Row(r)).collect();
            errors.add_many(&message, &locations, &fields);
        }
    }
}

impl Validator for UniquenessValidator {
    fn name(&self) -> &'static str {
        "unique"
    }

    fn validate(&self, table: &mut DataTable, errors: &mut ErrorStore) {
        for key in &self.keys {
            self.check_key(table, key, errors);
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Runs the configured checks in order.
pub struct ValidationEngine<'r> {
    validators: Vec<Box<dyn Validator + 'r>>,
}

impl<'r> ValidationEngine<'r> {
    /// Build the pipeline for `options`.
    ///
    /// Unknown format keys and malformed patterns are configuration errors.
    pub fn from_options(options: &Options, registry: &'r FormatRegistry) -> Result<Self> {
        for rule in &options.format {
            if !registry.contains(&rule.format) {
                return Err(SiftError::UnknownFormat(rule.format.clone()));
            }
        }
        if options.unique.iter().any(|key| key.leaves().is_empty()) {
            return Err(SiftError::Config("unique key without fields".to_string()));
        }

        let skip_empty_lines = options.skip_empty_lines;
        let mut validators: Vec<Box<dyn Validator + 'r>> = Vec::new();

        if options.header_is_canonical() {
            validators.push(Box::new(FieldCountValidator { skip_empty_lines }));
        }
        if !options.required.is_empty() {
            validators.push(Box::new(RequiredValidator {
                fields: options.required.clone(),
                skip_empty_lines,
            }));
        }
        if !options.not_null.is_empty() {
            validators.push(Box::new(NotNullValidator {
                fields: options.not_null.clone(),
                skip_empty_lines,
            }));
        }
        if let Some(allowed) = &options.allowed {
            let patterns = options
                .allowed_regexp
                .iter()
                .map(|p| Regex::new(p))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            validators.push(Box::new(AllowedFieldsValidator {
                allowed: allowed.clone(),
                patterns,
            }));
        }
        if !options.format.is_empty() {
            validators.push(Box::new(FormatValidator {
                rules: options.format.clone(),
                registry,
                null_value: options.null_value.clone(),
                skip_empty_lines,
            }));
        }
        // last: compares coerced values
        if !options.unique.is_empty() {
            validators.push(Box::new(UniquenessValidator {
                keys: options.unique.clone(),
                must_exist: options.unique_must_exist,
                skip_empty_lines,
            }));
        }

        Ok(Self { validators })
    }

    /// Names of the checks in run order.
    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run all validators.
    pub fn validate(&self, table: &mut DataTable, errors: &mut ErrorStore) {
        for validator in &self.validators {
            let before = errors.errors_count(None);
            validator.validate(table, errors);
            tracing::trace!(
                validator = validator.name(),
                new_errors = errors.errors_count(None) - before,
                "validator finished"
            );
        }
    }
}
