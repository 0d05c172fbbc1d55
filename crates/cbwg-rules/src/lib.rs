//! `cbwg-rules`: Hashcat-style rule grammar and mutation engine.
//!
//! This crate is the fuzz target: zero I/O, zero threads, zero logging.
//! [`parse_rule`] turns one rule line into a [`Program`]; [`apply`] runs a
//! program against one base word and yields at most one candidate.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;

pub mod program;

pub mod parser;

pub mod executor;

pub use error::{ParamKind, RuleSyntaxError};
pub use executor::{apply, MAX_CANDIDATE_LEN};
pub use parser::{is_skippable, parse_rule, parse_rule_bytes, MAX_RULE_LEN};
pub use program::{Operation, Position, Program, MAX_POSITION};
