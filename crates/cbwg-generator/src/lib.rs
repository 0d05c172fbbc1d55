//! `cbwg-generator`: parallel wordlist generation for cbwg.
//!
//! Loads rule files into [`RuleSet`]s, reads base words from a
//! [`FileSource`], and drives the rule engine from `cbwg-rules` over a
//! worker pool. Candidates pass a [`CandidateFilter`] and a shared
//! [`DedupSet`] before a single writer flushes them to a [`CandidateSink`].

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod config;
pub mod error;

pub mod rules;

pub mod source;

pub mod filter;

pub mod dedup;

pub mod sink;

pub mod driver;

pub mod wordlist_response;

pub use config::{load_yaml, EngineConfig, Encoding, FilterConfig, SourceConfig};
pub use dedup::DedupSet;
pub use driver::{GenerationStats, Generator};
pub use error::{ConfigError, GenerateError, SourceError};
pub use filter::CandidateFilter;
pub use rules::{RuleSet, INLINE_ORIGIN};
pub use sink::{CandidateSink, LineSink};
pub use source::{read_words, FileSource, Words};
pub use wordlist_response::{parse_wordlist_response, ResponseError};
