//! Fuzz target for rule application.
//!
//! The input is split at the first newline: the head is a rule line, the
//! tail is a base word. Parsing and applying must never panic, and no
//! growing operation may push a candidate past `MAX_CANDIDATE_LEN`.
//!
//! # Usage
//!
//! ```sh
//! cd crates/cbwg-rules
//! cargo +nightly fuzz run apply_rule -- -max_len=1024
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (rule, word) = text.split_once('\n').unwrap_or((text, ""));
    let Ok(program) = cbwg_rules::parse_rule(rule) else {
        return;
    };
    if let Some(candidate) = cbwg_rules::apply(&program, word) {
        let limit = cbwg_rules::MAX_CANDIDATE_LEN.max(word.chars().count());
        assert!(candidate.chars().count() <= limit);
    }
});
