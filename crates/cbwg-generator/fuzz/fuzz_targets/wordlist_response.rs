//! Fuzz target for the LLM wordlist response parser.
//!
//! Feeds arbitrary strings to `parse_wordlist_response`. Must never panic,
//! and every returned word must be trimmed and non-empty.
//!
//! # Usage
//!
//! ```sh
//! cd crates/cbwg-generator
//! cargo +nightly fuzz run wordlist_response -- -max_len=8192
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(words) = cbwg_generator::parse_wordlist_response(text) {
            assert!(words.iter().all(|w| !w.is_empty() && w.trim() == w));
        }
    }
});
