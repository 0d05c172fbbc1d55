#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for rule application.

use cbwg_rules::{apply, parse_rule, Operation, Position, Program, MAX_CANDIDATE_LEN};
use proptest::prelude::*;

fn program(rule: &str) -> Program {
    parse_rule(rule).unwrap()
}

/// Words mixing ASCII letters of both cases, digits, and a few non-ASCII scalars.
fn word_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9éßÄ!@ ]{0,24}"
}

fn position_strategy() -> impl Strategy<Value = Position> {
    (0u8..=cbwg_rules::MAX_POSITION).prop_map(|v| Position::new(v).unwrap())
}

/// Operations that can grow the working string.
fn growing_op_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Duplicate),
        Just(Operation::Reflect),
        Just(Operation::DuplicateAllChars),
        position_strategy().prop_map(Operation::DuplicateN),
        position_strategy().prop_map(Operation::DuplicateFirst),
        position_strategy().prop_map(Operation::DuplicateLast),
        position_strategy().prop_map(Operation::DuplicateFirstBlock),
        position_strategy().prop_map(Operation::DuplicateLastBlock),
        any::<char>().prop_map(Operation::AppendChar),
        any::<char>().prop_map(Operation::PrependChar),
    ]
}

proptest! {
    /// Applying the same program twice gives the same result.
    #[test]
    fn apply_is_deterministic(word in word_strategy(), rule in "[:lucCtrdf{}\\[\\]qkK$^]{0,8}1?") {
        if let Ok(p) = parse_rule(&rule) {
            prop_assert_eq!(apply(&p, &word), apply(&p, &word));
        }
    }

    /// `:` and the empty program return the word unchanged.
    #[test]
    fn noop_is_identity(word in ".{0,64}") {
        prop_assert_eq!(apply(&program(":"), &word), Some(word.clone()));
        prop_assert_eq!(apply(&Program::default(), &word), Some(word.clone()));
    }

    /// Uppercasing then lowercasing equals lowercasing.
    #[test]
    fn upper_then_lower_equals_lower(word in ".{0,64}") {
        prop_assert_eq!(apply(&program("ul"), &word), apply(&program("l"), &word));
    }

    /// Reversing twice is the identity.
    #[test]
    fn reverse_is_an_involution(word in ".{0,64}") {
        prop_assert_eq!(apply(&program("rr"), &word), Some(word.clone()));
    }

    /// Toggling case twice is the identity.
    #[test]
    fn toggle_is_an_involution(word in word_strategy()) {
        prop_assert_eq!(apply(&program("tt"), &word), Some(word.clone()));
    }

    /// Rotating left then right is the identity.
    #[test]
    fn rotations_cancel(word in ".{0,64}") {
        prop_assert_eq!(apply(&program("{}"), &word), Some(word.clone()));
    }

    /// Truncation yields `min(N, len)` scalars and never rejects.
    #[test]
    fn truncate_length(word in ".{0,48}", n in position_strategy()) {
        let p = Program::new(vec![Operation::Truncate(n)]);
        let out = apply(&p, &word).unwrap();
        prop_assert_eq!(out.chars().count(), n.get().min(word.chars().count()));
        prop_assert!(word.starts_with(&out));
    }

    /// Case functions preserve length in scalars.
    #[test]
    fn case_functions_preserve_length(word in ".{0,64}", rule in "[lucCt]{1,4}") {
        let out = apply(&program(&rule), &word).unwrap();
        prop_assert_eq!(out.chars().count(), word.chars().count());
    }

    /// Growing operations never produce a candidate past the limit.
    #[test]
    fn growth_is_bounded(
        word in ".{0,64}",
        ops in proptest::collection::vec(growing_op_strategy(), 1..12),
    ) {
        if let Some(out) = apply(&Program::new(ops), &word) {
            prop_assert!(out.chars().count() <= MAX_CANDIDATE_LEN.max(word.chars().count()));
        }
    }

    /// Rejection functions either pass the word through or reject it.
    #[test]
    fn rejections_never_modify(word in word_strategy(), rule in "[<>_][0-9A-Z]|[!/()][a-z]|[=%][0-9][a-z]") {
        if let Some(out) = apply(&program(&rule), &word) {
            prop_assert_eq!(out, word);
        }
    }
}
