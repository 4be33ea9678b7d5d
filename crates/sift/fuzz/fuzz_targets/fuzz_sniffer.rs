//! Fuzz target for dialect detection.
//!
//! Detection must never panic and must always return a known delimiter.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sift::input::{DELIMITERS, detect_delimiter, detect_quote};

fuzz_target!(|data: &str| {
    assert!(DELIMITERS.contains(&detect_delimiter(data)));
    assert!(matches!(detect_quote(data), b'"' | b'\''));
});
