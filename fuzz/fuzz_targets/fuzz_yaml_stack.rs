//! Fuzz target for YAML stack documents.
//!
//! Decoding and graph building may reject input but must never panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_yaml_stack
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = stackguard_stack::fuzz::parse_yaml_stack(text);
    }
});
