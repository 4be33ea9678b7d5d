//! Fuzz target for format coercions.
//!
//! Every registered coercion must accept any text without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sift::FormatRegistry;

fuzz_target!(|data: &str| {
    let registry = FormatRegistry::global();
    for key in registry.keys() {
        if let Some(coercion) = registry.get(key) {
            let _ = coercion.apply(data);
        }
    }
});
