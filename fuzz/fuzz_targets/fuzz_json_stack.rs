//! Fuzz target for JSON stack documents and state exports.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_json_stack
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = stackguard_stack::fuzz::parse_json_stack(text);
    }
});
