//! Rule grammar error types for `cbwg-rules`.

use std::fmt;

use thiserror::Error;

/// Kind of parameter a rule function expects after its leading character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A position or count from the `0-9A-Z` alphabet.
    Position,
    /// Any single character, taken verbatim.
    Character,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("position"),
            Self::Character => f.write_str("character"),
        }
    }
}

/// Errors produced while parsing a single rule line.
///
/// Every variant carries the 1-based character column it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSyntaxError {
    /// The character at `column` does not start any known rule function.
    #[error("unknown rule function {found:?} at column {column}")]
    UnknownFunction {
        /// Column of the offending character.
        column: usize,
        /// The offending character.
        found: char,
    },

    /// The line ended before a rule function received all its parameters.
    #[error("rule function '{function}' expects a {expected} at column {column}, found end of rule")]
    MissingParameter {
        /// Column where the parameter was expected.
        column: usize,
        /// Leading character of the incomplete function.
        function: char,
        /// The parameter that is missing.
        expected: ParamKind,
    },

    /// A position parameter is outside the `0-9A-Z` alphabet.
    #[error("invalid position {found:?} for rule function '{function}' at column {column}")]
    InvalidPosition {
        /// Column of the invalid parameter.
        column: usize,
        /// Leading character of the function.
        function: char,
        /// The invalid parameter character.
        found: char,
    },

    /// The raw rule bytes are not valid UTF-8.
    #[error("rule is not valid UTF-8 at column {column}")]
    InvalidUtf8 {
        /// Column of the first invalid byte sequence.
        column: usize,
    },

    /// The rule exceeds [`crate::MAX_RULE_LEN`] bytes.
    #[error("rule is {len} bytes long, limit is {limit}", limit = crate::MAX_RULE_LEN)]
    TooLong {
        /// Column of the first character past the byte limit.
        column: usize,
        /// Length of the rejected line in bytes.
        len: usize,
    },
}

impl RuleSyntaxError {
    /// The 1-based character column this error points at.
    #[must_use]
    pub const fn column(&self) -> usize {
        match self {
            Self::UnknownFunction { column, .. }
            | Self::MissingParameter { column, .. }
            | Self::InvalidPosition { column, .. }
            | Self::InvalidUtf8 { column }
            | Self::TooLong { column, .. } => *column,
        }
    }
}
