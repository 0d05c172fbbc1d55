//! Rule program execution.
//!
//! [`apply`] threads a working string through every operation of a program.
//! The working string is a `Vec<char>` so positions address Unicode scalar
//! values, never bytes.
//!
//! An operation that cannot apply to the current working string (position
//! past the end, empty range, deleting from an empty word, growing past
//! [`MAX_CANDIDATE_LEN`]) rejects the whole candidate. Rejection functions
//! (`<`, `>`, `_`, `!`, `/`, `(`, `)`, `=`, `%`) reject when their condition
//! holds. A rejected candidate is `None`, never an error.

use std::iter;

use crate::program::{Operation, Program};

/// Longest candidate a growing operation may produce, in scalar values.
///
/// Matches hashcat's password buffer. Operations that do not grow the word
/// are not limited, so long base words still pass through `:`, `l`, `r`...
pub const MAX_CANDIDATE_LEN: usize = 256;

/// Apply `program` to `word`.
///
/// Returns `None` when any operation is inapplicable to the working string
/// at the moment it runs. Pure and deterministic.
#[must_use]
pub fn apply(program: &Program, word: &str) -> Option<String> {
    let mut chars: Vec<char> = word.chars().collect();
    for op in program.operations() {
        step(*op, &mut chars)?;
    }
    Some(chars.into_iter().collect())
}

/// `Some(())` when `cond` holds.
fn require(cond: bool) -> Option<()> {
    cond.then_some(())
}

/// `Some(())` when a grown working string of `len` scalars is allowed.
fn fits(len: Option<usize>) -> Option<()> {
    require(len? <= MAX_CANDIDATE_LEN)
}

fn toggle(c: &mut char) {
    if c.is_ascii_uppercase() {
        c.make_ascii_lowercase();
    } else {
        c.make_ascii_uppercase();
    }
}

fn remap(c: &mut char, f: impl FnOnce(u32) -> Option<u32>) -> Option<()> {
    *c = char::from_u32(f(u32::from(*c))?)?;
    Some(())
}

#[allow(clippy::too_many_lines)]
fn step(op: Operation, chars: &mut Vec<char>) -> Option<()> {
    let len = chars.len();
    match op {
        Operation::Noop => {}

        // ── Case ───────────────────────────────────────────────────
        Operation::Lowercase => chars.iter_mut().for_each(char::make_ascii_lowercase),
        Operation::Uppercase => chars.iter_mut().for_each(char::make_ascii_uppercase),
        Operation::Capitalize => {
            if let Some((first, rest)) = chars.split_first_mut() {
                first.make_ascii_uppercase();
                rest.iter_mut().for_each(char::make_ascii_lowercase);
            }
        }
        Operation::InvertCapitalize => {
            if let Some((first, rest)) = chars.split_first_mut() {
                first.make_ascii_lowercase();
                rest.iter_mut().for_each(char::make_ascii_uppercase);
            }
        }
        Operation::ToggleCase => chars.iter_mut().for_each(toggle),
        Operation::ToggleCaseAt(n) => toggle(chars.get_mut(n.get())?),

        // ── Whole-word rearrangement ───────────────────────────────
        Operation::Reverse => chars.reverse(),
        Operation::Duplicate => {
            fits(len.checked_mul(2))?;
            chars.extend_from_within(..);
        }
        Operation::DuplicateN(n) => {
            fits(len.checked_mul(n.get().checked_add(1)?))?;
            for _ in 0..n.get() {
                chars.extend_from_within(..len);
            }
        }
        Operation::Reflect => {
            fits(len.checked_mul(2))?;
            chars.extend_from_within(..);
            chars.get_mut(len..)?.reverse();
        }
        Operation::RotateLeft => {
            if len > 0 {
                chars.rotate_left(1);
            }
        }
        Operation::RotateRight => {
            if len > 0 {
                chars.rotate_right(1);
            }
        }

        // ── Adding characters ──────────────────────────────────────
        Operation::AppendChar(c) => {
            fits(len.checked_add(1))?;
            chars.push(c);
        }
        Operation::PrependChar(c) => {
            fits(len.checked_add(1))?;
            chars.insert(0, c);
        }
        Operation::InsertAt(n, c) => {
            require(n.get() <= len)?;
            fits(len.checked_add(1))?;
            chars.insert(n.get(), c);
        }
        Operation::DuplicateFirst(n) => {
            let first = *chars.first()?;
            fits(len.checked_add(n.get()))?;
            chars.splice(0..0, iter::repeat(first).take(n.get()));
        }
        Operation::DuplicateLast(n) => {
            let last = *chars.last()?;
            fits(len.checked_add(n.get()))?;
            chars.extend(iter::repeat(last).take(n.get()));
        }
        Operation::DuplicateAllChars => {
            fits(len.checked_mul(2))?;
            *chars = chars.iter().flat_map(|&c| [c, c]).collect();
        }
        Operation::DuplicateFirstBlock(n) => {
            require(n.get() <= len)?;
            fits(len.checked_add(n.get()))?;
            let head = chars.get(..n.get())?.to_vec();
            chars.splice(0..0, head);
        }
        Operation::DuplicateLastBlock(n) => {
            let start = len.checked_sub(n.get())?;
            fits(len.checked_add(n.get()))?;
            chars.extend_from_within(start..);
        }

        // ── Removing characters ────────────────────────────────────
        Operation::DeleteFirst => {
            require(len > 0)?;
            chars.remove(0);
        }
        Operation::DeleteLast => {
            chars.pop()?;
        }
        Operation::DeleteAt(n) => {
            require(n.get() < len)?;
            chars.remove(n.get());
        }
        Operation::ExtractRange(n, m) => {
            require(m.get() > 0)?;
            let end = n.get().checked_add(m.get())?;
            require(end <= len)?;
            chars.truncate(end);
            chars.drain(..n.get());
        }
        Operation::OmitRange(n, m) => {
            require(m.get() > 0)?;
            let end = n.get().checked_add(m.get())?;
            require(end <= len)?;
            chars.drain(n.get()..end);
        }
        Operation::Truncate(n) => chars.truncate(n.get()),
        Operation::Purge(x) => chars.retain(|&c| c != x),

        // ── Replacing characters ───────────────────────────────────
        Operation::OverwriteAt(n, c) => *chars.get_mut(n.get())? = c,
        Operation::Substitute(from, to) => {
            for c in chars.iter_mut().filter(|c| **c == from) {
                *c = to;
            }
        }
        Operation::SwapFront => {
            require(len >= 2)?;
            chars.swap(0, 1);
        }
        Operation::SwapBack => {
            let last = len.checked_sub(1)?;
            let before = len.checked_sub(2)?;
            chars.swap(before, last);
        }
        Operation::SwapAt(n, m) => {
            require(n.get() < len && m.get() < len)?;
            chars.swap(n.get(), m.get());
        }
        Operation::ShiftLeftAt(n) => remap(chars.get_mut(n.get())?, |v| v.checked_shl(1))?,
        Operation::ShiftRightAt(n) => remap(chars.get_mut(n.get())?, |v| v.checked_shr(1))?,
        Operation::IncrementAt(n) => remap(chars.get_mut(n.get())?, |v| v.checked_add(1))?,
        Operation::DecrementAt(n) => remap(chars.get_mut(n.get())?, |v| v.checked_sub(1))?,
        Operation::ReplaceWithNext(n) => {
            let next = *chars.get(n.get().checked_add(1)?)?;
            *chars.get_mut(n.get())? = next;
        }
        Operation::ReplaceWithPrev(n) => {
            let prev = *chars.get(n.get().checked_sub(1)?)?;
            *chars.get_mut(n.get())? = prev;
        }

        // ── Rejection ──────────────────────────────────────────────
        Operation::RejectLonger(n) => require(len <= n.get())?,
        Operation::RejectShorter(n) => require(len >= n.get())?,
        Operation::RejectUnlessLength(n) => require(len == n.get())?,
        Operation::RejectContains(x) => require(!chars.contains(&x))?,
        Operation::RejectMissing(x) => require(chars.contains(&x))?,
        Operation::RejectUnlessStarts(x) => require(chars.first() == Some(&x))?,
        Operation::RejectUnlessEnds(x) => require(chars.last() == Some(&x))?,
        Operation::RejectUnlessAt(n, x) => require(chars.get(n.get()) == Some(&x))?,
        Operation::RejectFewer(n, x) => {
            require(chars.iter().filter(|&&c| c == x).count() >= n.get())?;
        }
    }
    Some(())
}
