//! Fuzz target for the rule parser.
//!
//! Feeds arbitrary bytes to `parse_rule_bytes`. Must never panic, and any
//! program it accepts must render back to text that parses to itself.
//!
//! # Usage
//!
//! ```sh
//! cd crates/cbwg-rules
//! cargo +nightly fuzz run parse_rule -- -max_len=512
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(program) = cbwg_rules::parse_rule_bytes(data) {
        let rendered = program.to_string();
        assert_eq!(cbwg_rules::parse_rule(&rendered), Ok(program));
    }
});
