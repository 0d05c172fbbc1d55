//! Rule programs: the parsed, executable form of a rule line.
//!
//! A [`Program`] is an immutable sequence of [`Operation`]s. Operations are
//! plain `Copy` values whose parameters were validated by the parser, so the
//! executor can match over them exhaustively without an "unknown" branch.

use std::fmt;
use std::str::FromStr;

use crate::error::RuleSyntaxError;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Largest value a [`Position`] can hold (`Z`).
pub const MAX_POSITION: u8 = 35;

/// A position or count parameter, encoded in rule text as `0-9` then `A-Z`.
///
/// Positions are stored unresolved: whether a position is in range is only
/// known once the executor sees the current working string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(u8);

impl Position {
    /// Build a position from its numeric value (`0..=35`).
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= MAX_POSITION {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Decode a position from the hashcat positional alphabet.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self((c as u8).wrapping_sub(b'0'))),
            'A'..='Z' => Some(Self((c as u8).wrapping_sub(b'A').wrapping_add(10))),
            _ => None,
        }
    }

    /// The encoded form of this position.
    #[must_use]
    pub const fn to_char(self) -> char {
        if self.0 < 10 {
            b'0'.wrapping_add(self.0) as char
        } else {
            b'A'.wrapping_add(self.0.wrapping_sub(10)) as char
        }
    }

    /// Numeric value as an index or count.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// One atomic transformation step of a rule program.
///
/// The comment on each variant is the rule syntax that produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `:`
    Noop,
    /// `l`
    Lowercase,
    /// `u`
    Uppercase,
    /// `c`
    Capitalize,
    /// `C`
    InvertCapitalize,
    /// `t`
    ToggleCase,
    /// `TN`
    ToggleCaseAt(Position),
    /// `r`
    Reverse,
    /// `d`
    Duplicate,
    /// `pN`
    DuplicateN(Position),
    /// `f`
    Reflect,
    /// `{`
    RotateLeft,
    /// `}`
    RotateRight,
    /// `$X`
    AppendChar(char),
    /// `^X`
    PrependChar(char),
    /// `[`
    DeleteFirst,
    /// `]`
    DeleteLast,
    /// `DN`
    DeleteAt(Position),
    /// `xNM`
    ExtractRange(Position, Position),
    /// `ONM`
    OmitRange(Position, Position),
    /// `iNX`
    InsertAt(Position, char),
    /// `oNX`
    OverwriteAt(Position, char),
    /// `'N`
    Truncate(Position),
    /// `sXY`
    Substitute(char, char),
    /// `@X`
    Purge(char),
    /// `zN`
    DuplicateFirst(Position),
    /// `ZN`
    DuplicateLast(Position),
    /// `q`
    DuplicateAllChars,

    // Hashcat-specific functions.
    /// `k`
    SwapFront,
    /// `K`
    SwapBack,
    /// `*NM`
    SwapAt(Position, Position),
    /// `LN`
    ShiftLeftAt(Position),
    /// `RN`
    ShiftRightAt(Position),
    /// `+N`
    IncrementAt(Position),
    /// `-N`
    DecrementAt(Position),
    /// `.N`
    ReplaceWithNext(Position),
    /// `,N`
    ReplaceWithPrev(Position),
    /// `yN`
    DuplicateFirstBlock(Position),
    /// `YN`
    DuplicateLastBlock(Position),

    // Rejection functions: pass the word through unchanged or reject it.
    /// `<N`
    RejectLonger(Position),
    /// `>N`
    RejectShorter(Position),
    /// `_N`
    RejectUnlessLength(Position),
    /// `!X`
    RejectContains(char),
    /// `/X`
    RejectMissing(char),
    /// `(X`
    RejectUnlessStarts(char),
    /// `)X`
    RejectUnlessEnds(char),
    /// `=NX`
    RejectUnlessAt(Position, char),
    /// `%NX`
    RejectFewer(Position, char),
}

impl Operation {
    /// The character that introduces this operation in rule text.
    #[must_use]
    pub const fn function(&self) -> char {
        match self {
            Self::Noop => ':',
            Self::Lowercase => 'l',
            Self::Uppercase => 'u',
            Self::Capitalize => 'c',
            Self::InvertCapitalize => 'C',
            Self::ToggleCase => 't',
            Self::ToggleCaseAt(_) => 'T',
            Self::Reverse => 'r',
            Self::Duplicate => 'd',
            Self::DuplicateN(_) => 'p',
            Self::Reflect => 'f',
            Self::RotateLeft => '{',
            Self::RotateRight => '}',
            Self::AppendChar(_) => '$',
            Self::PrependChar(_) => '^',
            Self::DeleteFirst => '[',
            Self::DeleteLast => ']',
            Self::DeleteAt(_) => 'D',
            Self::ExtractRange(..) => 'x',
            Self::OmitRange(..) => 'O',
            Self::InsertAt(..) => 'i',
            Self::OverwriteAt(..) => 'o',
            Self::Truncate(_) => '\'',
            Self::Substitute(..) => 's',
            Self::Purge(_) => '@',
            Self::DuplicateFirst(_) => 'z',
            Self::DuplicateLast(_) => 'Z',
            Self::DuplicateAllChars => 'q',
            Self::SwapFront => 'k',
            Self::SwapBack => 'K',
            Self::SwapAt(..) => '*',
            Self::ShiftLeftAt(_) => 'L',
            Self::ShiftRightAt(_) => 'R',
            Self::IncrementAt(_) => '+',
            Self::DecrementAt(_) => '-',
            Self::ReplaceWithNext(_) => '.',
            Self::ReplaceWithPrev(_) => ',',
            Self::DuplicateFirstBlock(_) => 'y',
            Self::DuplicateLastBlock(_) => 'Y',
            Self::RejectLonger(_) => '<',
            Self::RejectShorter(_) => '>',
            Self::RejectUnlessLength(_) => '_',
            Self::RejectContains(_) => '!',
            Self::RejectMissing(_) => '/',
            Self::RejectUnlessStarts(_) => '(',
            Self::RejectUnlessEnds(_) => ')',
            Self::RejectUnlessAt(..) => '=',
            Self::RejectFewer(..) => '%',
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = self.function();
        match *self {
            Self::ToggleCaseAt(n)
            | Self::DuplicateN(n)
            | Self::DeleteAt(n)
            | Self::Truncate(n)
            | Self::DuplicateFirst(n)
            | Self::DuplicateLast(n)
            | Self::ShiftLeftAt(n)
            | Self::ShiftRightAt(n)
            | Self::IncrementAt(n)
            | Self::DecrementAt(n)
            | Self::ReplaceWithNext(n)
            | Self::ReplaceWithPrev(n)
            | Self::DuplicateFirstBlock(n)
            | Self::DuplicateLastBlock(n)
            | Self::RejectLonger(n)
            | Self::RejectShorter(n)
            | Self::RejectUnlessLength(n) => write!(f, "{function}{n}"),
            Self::ExtractRange(n, m) | Self::OmitRange(n, m) | Self::SwapAt(n, m) => {
                write!(f, "{function}{n}{m}")
            }
            Self::InsertAt(n, c)
            | Self::OverwriteAt(n, c)
            | Self::RejectUnlessAt(n, c)
            | Self::RejectFewer(n, c) => write!(f, "{function}{n}{c}"),
            Self::AppendChar(c)
            | Self::PrependChar(c)
            | Self::Purge(c)
            | Self::RejectContains(c)
            | Self::RejectMissing(c)
            | Self::RejectUnlessStarts(c)
            | Self::RejectUnlessEnds(c) => write!(f, "{function}{c}"),
            Self::Substitute(from, to) => write!(f, "{function}{from}{to}"),
            _ => write!(f, "{function}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

/// An ordered, immutable sequence of operations parsed from one rule line.
///
/// Programs are `Send + Sync` and are shared by reference across workers.
/// An empty program behaves like `:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program {
    operations: Box<[Operation]>,
}

impl Program {
    /// Build a program from already-validated operations.
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            operations: operations.into_boxed_slice(),
        }
    }

    /// The operations, in execution order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the program has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl From<Vec<Operation>> for Program {
    fn from(operations: Vec<Operation>) -> Self {
        Self::new(operations)
    }
}

/// Renders canonical rule text: operations back to back, no separators.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in self.operations.iter() {
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

impl FromStr for Program {
    type Err = RuleSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_rule(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_alphabet() {
        assert_eq!(Position::from_char('0').map(Position::get), Some(0));
        assert_eq!(Position::from_char('9').map(Position::get), Some(9));
        assert_eq!(Position::from_char('A').map(Position::get), Some(10));
        assert_eq!(Position::from_char('Z').map(Position::get), Some(35));
        assert_eq!(Position::from_char('a'), None);
        assert_eq!(Position::from_char('!'), None);
    }

    #[test]
    fn position_char_roundtrip() {
        for value in 0..=MAX_POSITION {
            let pos = Position::new(value).unwrap();
            assert_eq!(Position::from_char(pos.to_char()), Some(pos));
        }
        assert_eq!(Position::new(MAX_POSITION + 1), None);
    }

    #[test]
    fn display_renders_parameters() {
        let n = Position::new(3).unwrap();
        let m = Position::new(12).unwrap();
        let program = Program::new(vec![
            Operation::Capitalize,
            Operation::AppendChar('1'),
            Operation::ExtractRange(n, m),
            Operation::InsertAt(n, '!'),
            Operation::Substitute('a', '@'),
            Operation::Truncate(m),
        ]);
        assert_eq!(program.to_string(), "c$1x3Ci3!sa@'C");
    }

    #[test]
    fn empty_program_renders_empty() {
        assert_eq!(Program::default().to_string(), "");
        assert!(Program::default().is_empty());
    }
}
