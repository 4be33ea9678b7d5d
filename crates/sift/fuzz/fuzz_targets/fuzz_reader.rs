//! Fuzz target for loading and validating tables.
//!
//! Random text and a random rule set must never panic, and every row must
//! come out with the same width.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sift::{FieldRef, Options, Sift};

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    read_header: bool,
    check_fields_count: bool,
    skip_empty_lines: bool,
    required: Option<u8>,
    unique: Option<(u8, u8)>,
    integer: Option<u8>,
}

fuzz_target!(|input: Input| {
    // Only process reasonable-sized inputs to avoid OOM
    if input.data.len() > 100_000 {
        return;
    }

    let mut options = Options::default()
        .with_read_header(input.read_header)
        .with_check_fields_count(input.check_fields_count)
        .with_skip_empty_lines(input.skip_empty_lines);
    if let Some(col) = input.required {
        options = options.with_required(col as usize);
    }
    if let Some((a, b)) = input.unique {
        options = options.with_unique(FieldRef::group([a as usize, b as usize]));
    }
    if let Some(col) = input.integer {
        options = options.with_format(col as usize, "integer");
    }

    if let Ok(sift) = Sift::from_bytes(&input.data, options) {
        let width = sift.column_count();
        assert!(sift.table().rows().iter().all(|row| row.len() == width));
        let _ = sift.error_store().to_json();
    }
});
