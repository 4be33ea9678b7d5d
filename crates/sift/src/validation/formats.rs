//! Named cell coercions.
//!
//! The registry is built once and never changes. Validators receive it by
//! reference; [`FormatRegistry::global`] returns the shared instance.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());
static FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+([.,]\d*)?|[.,]\d+)([eE][+-]?\d+)?$").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)https?://[^\s/$.?#][^\s]*$").unwrap());

static REGISTRY: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::builtin);

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// A value could not be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value could not be converted")]
pub struct CoercionFailed;

/// How a format converts a cell.
#[derive(Debug, Clone, Copy)]
pub enum Coercion {
    /// Validating filter: converted value, or `None` on failure.
    Filter(fn(&str) -> Option<String>),
    /// Transform: an empty result counts as failure.
    Transform(fn(&str) -> String),
    /// Raw operation with its own result.
    Raw(fn(&str) -> Result<String, CoercionFailed>),
}

impl Coercion {
    pub fn apply(&self, value: &str) -> Result<String, CoercionFailed> {
        match self {
            Coercion::Filter(filter) => filter(value).ok_or(CoercionFailed),
            Coercion::Transform(transform) => {
                let out = transform(value);
                if out.is_empty() {
                    Err(CoercionFailed)
                } else {
                    Ok(out)
                }
            }
            Coercion::Raw(raw) => raw(value),
        }
    }
}

/// Format keys and their coercions.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    entries: IndexMap<&'static str, Coercion>,
}

impl FormatRegistry {
    /// The shared built-in registry.
    pub fn global() -> &'static FormatRegistry {
        &REGISTRY
    }

    /// Build the built-in format table.
    pub fn builtin() -> Self {
        let mut entries: IndexMap<&'static str, Coercion> = IndexMap::new();
        entries.insert("integer", Coercion::Filter(to_integer));
        entries.insert("int", Coercion::Filter(to_integer));
        entries.insert("float", Coercion::Filter(to_float));
        entries.insert("number", Coercion::Filter(to_float));
        entries.insert("boolean", Coercion::Filter(to_boolean));
        entries.insert("bool", Coercion::Filter(to_boolean));
        entries.insert("date", Coercion::Filter(to_date));
        entries.insert("datetime", Coercion::Filter(to_datetime));
        entries.insert("email", Coercion::Filter(check_email));
        entries.insert("url", Coercion::Filter(check_url));
        entries.insert("string", Coercion::Transform(trim));
        entries.insert("trim", Coercion::Transform(trim));
        entries.insert("lower", Coercion::Transform(lower));
        entries.insert("upper", Coercion::Transform(upper));
        entries.insert("json", Coercion::Raw(to_json));
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Coercion> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

fn to_integer(value: &str) -> Option<String> {
    if !INTEGER.is_match(value) {
        return None;
    }
    value.parse::<i64>().ok().map(|n| n.to_string())
}

fn to_float(value: &str) -> Option<String> {
    if !FLOAT.is_match(value) {
        return None;
    }
    let number: f64 = value.replace(',', ".").parse().ok()?;
    number.is_finite().then(|| number.to_string())
}

fn to_boolean(value: &str) -> Option<String> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" | "t" => Some("true".to_string()),
        "false" | "no" | "n" | "0" | "off" | "f" => Some("false".to_string()),
        _ => None,
    }
}

fn to_date(value: &str) -> Option<String> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn to_datetime(value: &str) -> Option<String> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn check_email(value: &str) -> Option<String> {
    EMAIL.is_match(value).then(|| value.to_string())
}

fn check_url(value: &str) -> Option<String> {
    URL.is_match(value).then(|| value.to_string())
}

fn trim(value: &str) -> String {
    value.trim().to_string()
}

fn lower(value: &str) -> String {
    value.trim().to_lowercase()
}

fn upper(value: &str) -> String {
    value.trim().to_uppercase()
}

fn to_json(value: &str) -> Result<String, CoercionFailed> {
    serde_json::from_str::<serde_json::Value>(value)
        .map(|json| json.to_string())
        .map_err(|_| CoercionFailed)
}
