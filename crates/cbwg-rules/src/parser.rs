//! Single-pass parser for hashcat rule lines.
//!
//! Each rule function is one leading character followed by a fixed number of
//! parameter characters. The parser walks the line once, left to right, and
//! never looks past its end: a truncated function is reported as
//! [`RuleSyntaxError::MissingParameter`], never as a panic.
//!
//! Position parameters are decoded to a [`Position`] but not checked against
//! any word length; that happens in the executor.

use std::str::Chars;

use crate::error::{ParamKind, RuleSyntaxError};
use crate::program::{Operation, Position, Program};

/// Maximum length of a rule line in bytes (hashcat's rule buffer size).
pub const MAX_RULE_LEN: usize = 256;

/// Whether a rule-file line carries no rule: blank, or a `#` comment.
#[must_use]
pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parse one rule line into a [`Program`].
///
/// Spaces and tabs between functions are skipped. Character parameters are
/// taken verbatim, so `$ ` appends a space. An empty line yields an empty
/// program; callers filter blank and comment lines with [`is_skippable`].
///
/// # Errors
///
/// Returns a [`RuleSyntaxError`] naming the column of the first unknown
/// function, missing parameter, or invalid position, or
/// [`RuleSyntaxError::TooLong`] for lines over [`MAX_RULE_LEN`] bytes.
pub fn parse_rule(line: &str) -> Result<Program, RuleSyntaxError> {
    if line.len() > MAX_RULE_LEN {
        let column = line
            .char_indices()
            .take_while(|&(offset, _)| offset < MAX_RULE_LEN)
            .count()
            .saturating_add(1);
        return Err(RuleSyntaxError::TooLong {
            column,
            len: line.len(),
        });
    }

    let mut cursor = Cursor::new(line);
    let mut operations = Vec::new();

    while let Some((column, function)) = cursor.bump() {
        let op = match function {
            ' ' | '\t' => continue,
            ':' => Operation::Noop,
            'l' => Operation::Lowercase,
            'u' => Operation::Uppercase,
            'c' => Operation::Capitalize,
            'C' => Operation::InvertCapitalize,
            't' => Operation::ToggleCase,
            'T' => Operation::ToggleCaseAt(cursor.position(function)?),
            'r' => Operation::Reverse,
            'd' => Operation::Duplicate,
            'p' => Operation::DuplicateN(cursor.position(function)?),
            'f' => Operation::Reflect,
            '{' => Operation::RotateLeft,
            '}' => Operation::RotateRight,
            '$' => Operation::AppendChar(cursor.character(function)?),
            '^' => Operation::PrependChar(cursor.character(function)?),
            '[' => Operation::DeleteFirst,
            ']' => Operation::DeleteLast,
            'D' => Operation::DeleteAt(cursor.position(function)?),
            'x' => Operation::ExtractRange(cursor.position(function)?, cursor.position(function)?),
            'O' => Operation::OmitRange(cursor.position(function)?, cursor.position(function)?),
            'i' => Operation::InsertAt(cursor.position(function)?, cursor.character(function)?),
            'o' => Operation::OverwriteAt(cursor.position(function)?, cursor.character(function)?),
            '\'' => Operation::Truncate(cursor.position(function)?),
            's' => Operation::Substitute(cursor.character(function)?, cursor.character(function)?),
            '@' => Operation::Purge(cursor.character(function)?),
            'z' => Operation::DuplicateFirst(cursor.position(function)?),
            'Z' => Operation::DuplicateLast(cursor.position(function)?),
            'q' => Operation::DuplicateAllChars,
            'k' => Operation::SwapFront,
            'K' => Operation::SwapBack,
            '*' => Operation::SwapAt(cursor.position(function)?, cursor.position(function)?),
            'L' => Operation::ShiftLeftAt(cursor.position(function)?),
            'R' => Operation::ShiftRightAt(cursor.position(function)?),
            '+' => Operation::IncrementAt(cursor.position(function)?),
            '-' => Operation::DecrementAt(cursor.position(function)?),
            '.' => Operation::ReplaceWithNext(cursor.position(function)?),
            ',' => Operation::ReplaceWithPrev(cursor.position(function)?),
            'y' => Operation::DuplicateFirstBlock(cursor.position(function)?),
            'Y' => Operation::DuplicateLastBlock(cursor.position(function)?),
            '<' => Operation::RejectLonger(cursor.position(function)?),
            '>' => Operation::RejectShorter(cursor.position(function)?),
            '_' => Operation::RejectUnlessLength(cursor.position(function)?),
            '!' => Operation::RejectContains(cursor.character(function)?),
            '/' => Operation::RejectMissing(cursor.character(function)?),
            '(' => Operation::RejectUnlessStarts(cursor.character(function)?),
            ')' => Operation::RejectUnlessEnds(cursor.character(function)?),
            '=' => Operation::RejectUnlessAt(cursor.position(function)?, cursor.character(function)?),
            '%' => Operation::RejectFewer(cursor.position(function)?, cursor.character(function)?),
            found => return Err(RuleSyntaxError::UnknownFunction { column, found }),
        };
        operations.push(op);
    }

    Ok(Program::new(operations))
}

/// Parse a rule line given as raw bytes.
///
/// # Errors
///
/// Returns [`RuleSyntaxError::InvalidUtf8`] pointing at the first invalid
/// byte sequence, otherwise whatever [`parse_rule`] returns.
pub fn parse_rule_bytes(line: &[u8]) -> Result<Program, RuleSyntaxError> {
    match std::str::from_utf8(line) {
        Ok(text) => parse_rule(text),
        Err(err) => {
            let column = line
                .get(..err.valid_up_to())
                .and_then(|valid| std::str::from_utf8(valid).ok())
                .map_or(1, |valid| valid.chars().count().saturating_add(1));
            Err(RuleSyntaxError::InvalidUtf8 { column })
        }
    }
}

/// Character cursor that tracks the 1-based column of the next character.
struct Cursor<'a> {
    chars: Chars<'a>,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            chars: line.chars(),
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let c = self.chars.next()?;
        let column = self.column;
        self.column = self.column.saturating_add(1);
        Some((column, c))
    }

    fn character(&mut self, function: char) -> Result<char, RuleSyntaxError> {
        self.bump()
            .map(|(_, c)| c)
            .ok_or(RuleSyntaxError::MissingParameter {
                column: self.column,
                function,
                expected: ParamKind::Character,
            })
    }

    fn position(&mut self, function: char) -> Result<Position, RuleSyntaxError> {
        let (column, found) = self.bump().ok_or(RuleSyntaxError::MissingParameter {
            column: self.column,
            function,
            expected: ParamKind::Position,
        })?;
        Position::from_char(found).ok_or(RuleSyntaxError::InvalidPosition {
            column,
            function,
            found,
        })
    }
}
