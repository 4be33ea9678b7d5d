//! Delimiter and quote detection.

use crate::error::{Result, SiftError};
use crate::options::Options;

/// Delimiters to try when auto-detecting, in priority order.
///
/// Ties go to the earlier entry, so tab beats comma when both appear on the
/// same number of lines.
pub const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Delimiter used when no candidate appears in the sample.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Quote used when the sample has no quote character.
pub const DEFAULT_QUOTE: u8 = b'"';

/// Delimiter and quote for one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Dialect {
    /// Take the configured delimiter/quote, sniffing whichever is unset.
    pub fn resolve(sample: &str, options: &Options) -> Result<Self> {
        let delimiter = match options.delimiter {
            Some(c) => ascii_byte(c).ok_or_else(|| SiftError::InvalidDelimiter(c.to_string()))?,
            None => detect_delimiter(sample),
        };
        let quote = match options.quote {
            Some(c) => ascii_byte(c).ok_or_else(|| SiftError::InvalidQuote(c.to_string()))?,
            None => detect_quote(sample),
        };

        if delimiter == quote {
            return Err(SiftError::InvalidQuote(format!(
                "quote {:?} is the same as the delimiter",
                quote as char
            )));
        }

        tracing::debug!(
            delimiter = %(delimiter as char).escape_default(),
            quote = %(quote as char),
            "resolved dialect"
        );
        Ok(Self { delimiter, quote })
    }
}

/// Pick the candidate delimiter that appears on the most lines.
///
/// Each line counts once per candidate regardless of how many times the
/// candidate occurs on it. Only a strictly greater count replaces the
/// current best.
pub fn detect_delimiter(sample: &str) -> u8 {
    let mut counts = [0usize; DELIMITERS.len()];

    for line in sample.split('\n') {
        let bytes = line.as_bytes();
        for (count, delim) in counts.iter_mut().zip(DELIMITERS) {
            if bytes.contains(delim) {
                *count += 1;
            }
        }
    }

    let mut best = None;
    let mut best_count = 0;
    for (&count, &delim) in counts.iter().zip(DELIMITERS) {
        if count > best_count {
            best_count = count;
            best = Some(delim);
        }
    }

    best.unwrap_or(DEFAULT_DELIMITER)
}

/// The first `"` or `'` in the sample, or `"` if there is none.
pub fn detect_quote(sample: &str) -> u8 {
    sample
        .bytes()
        .find(|b| matches!(b, b'"' | b'\''))
        .unwrap_or(DEFAULT_QUOTE)
}

fn ascii_byte(c: char) -> Option<u8> {
    if c.is_ascii() && c != '\n' && c != '\r' {
        Some(c as u8)
    } else {
        None
    }
}
