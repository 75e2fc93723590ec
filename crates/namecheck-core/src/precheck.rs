//! Deterministic pre-check rules.
//!
//! Cheap structural rules that reject obviously invalid names before any
//! remote call is made. Rules run in a fixed order and the first failure
//! wins.
//!
//! | Order | Rule | Rejects |
//! |-------|------|---------|
//! | 1 | [`PrecheckReason::InvalidCharacters`] | anything but ASCII letters, whitespace, `-`, `.` |
//! | 2 | [`PrecheckReason::TooFewLetters`] | fewer than [`MIN_LETTERS`] ASCII letters |
//! | 3 | [`PrecheckReason::ConsecutivePunctuation`] | `--` or `..` |
//! | 4 | [`PrecheckReason::InvalidDotFormatting`] | a period glued to word characters on both sides (`m.ahmed`) |

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::candidate::NameCandidate;

/// Minimum number of ASCII letters a name must contain.
pub const MIN_LETTERS: usize = 3;

lazy_static! {
    /// Any character outside letters, whitespace, hyphen and period.
    pub static ref INVALID_CHAR_PATTERN: Regex = Regex::new(r"[^A-Za-z\s\-.]").unwrap();

    /// Doubled hyphen or doubled period.
    pub static ref CONSECUTIVE_PUNCT_PATTERN: Regex = Regex::new(r"--|\.\.").unwrap();

    /// Period with a word character immediately on both sides.
    pub static ref INNER_DOT_PATTERN: Regex = Regex::new(r"\w\.\w").unwrap();
}

/// Why a candidate failed the pre-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecheckReason {
    InvalidCharacters,
    TooFewLetters,
    ConsecutivePunctuation,
    InvalidDotFormatting,
}

impl PrecheckReason {
    /// Human-readable message returned to callers.
    pub fn message(&self) -> &'static str {
        match self {
            PrecheckReason::InvalidCharacters => "Invalid characters present",
            PrecheckReason::TooFewLetters => "Too few letters",
            PrecheckReason::ConsecutivePunctuation => "Consecutive punctuation",
            PrecheckReason::InvalidDotFormatting => {
                "Invalid dot formatting, must have spaces after dot(.)"
            }
        }
    }
}

impl fmt::Display for PrecheckReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of [`precheck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecheckResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<PrecheckReason>,
}

impl PrecheckResult {
    pub fn pass() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn fail(reason: PrecheckReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.valid
    }
}

/// Run the pre-check rules against a candidate.
pub fn precheck(candidate: &NameCandidate) -> PrecheckResult {
    match first_violation(candidate.normalized(), candidate.letter_count()) {
        Some(reason) => PrecheckResult::fail(reason),
        None => PrecheckResult::pass(),
    }
}

/// Run the pre-check rules against an already-normalized string.
pub fn precheck_str(normalized: &str) -> PrecheckResult {
    let letters = normalized.chars().filter(char::is_ascii_alphabetic).count();
    match first_violation(normalized, letters) {
        Some(reason) => PrecheckResult::fail(reason),
        None => PrecheckResult::pass(),
    }
}

fn first_violation(text: &str, letters: usize) -> Option<PrecheckReason> {
    if INVALID_CHAR_PATTERN.is_match(text) {
        return Some(PrecheckReason::InvalidCharacters);
    }
    if letters < MIN_LETTERS {
        return Some(PrecheckReason::TooFewLetters);
    }
    if CONSECUTIVE_PUNCT_PATTERN.is_match(text) {
        return Some(PrecheckReason::ConsecutivePunctuation);
    }
    if INNER_DOT_PATTERN.is_match(text) {
        return Some(PrecheckReason::InvalidDotFormatting);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn check(raw: &str) -> PrecheckResult {
        precheck(&NameCandidate::new(raw).unwrap())
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(check("Abdullah123").reason, Some(PrecheckReason::InvalidCharacters));
        assert_eq!(check("john_doe").reason, Some(PrecheckReason::InvalidCharacters));
        assert_eq!(check("o'brien").reason, Some(PrecheckReason::InvalidCharacters));
        assert_eq!(check("josé").reason, Some(PrecheckReason::InvalidCharacters));
    }

    #[test]
    fn test_too_few_letters() {
        assert_eq!(check("Ku").reason, Some(PrecheckReason::TooFewLetters));
        assert_eq!(check("Al").reason, Some(PrecheckReason::TooFewLetters));
        assert_eq!(check("a. b.").reason, Some(PrecheckReason::TooFewLetters));
        assert!(check("Ali").is_pass());
    }

    #[test]
    fn test_consecutive_punctuation() {
        assert_eq!(
            check("Jahanara--Begum").reason,
            Some(PrecheckReason::ConsecutivePunctuation)
        );
        assert_eq!(
            check("Mary..Anne").reason,
            Some(PrecheckReason::ConsecutivePunctuation)
        );
    }

    #[test]
    fn test_dot_formatting() {
        assert_eq!(
            check("m.ahmed").reason,
            Some(PrecheckReason::InvalidDotFormatting)
        );
        assert_eq!(
            check("Ravi.kumar").reason,
            Some(PrecheckReason::InvalidDotFormatting)
        );
        assert!(check("Mr. Hanif Uddin").is_pass());
        assert!(check("p. k. robi").is_pass());
        assert!(check("m. a. h. hashan").is_pass());
    }

    #[test]
    fn test_first_failing_rule_wins() {
        // Digits and too few letters: character rule is checked first.
        assert_eq!(check("A1").reason, Some(PrecheckReason::InvalidCharacters));
        // Too few letters and a doubled period: letter count is checked first.
        assert_eq!(check("a..b").reason, Some(PrecheckReason::TooFewLetters));
    }

    #[test]
    fn test_realistic_shapes_pass() {
        for name in ["Aisha Khan", "John-Doe", "Beauty", "Md Jewel", "Mary. Anne Smith"] {
            let result = check(name);
            assert!(result.is_pass(), "{name} should pass: {result:?}");
            assert_eq!(result.reason, None);
        }
    }

    #[test]
    fn test_precheck_str_matches_candidate_path() {
        for name in ["M.ahmed", "Ku", "Mr. Hanif", "Ab1"] {
            let candidate = NameCandidate::new(name).unwrap();
            assert_eq!(precheck_str(candidate.normalized()), precheck(&candidate));
        }
    }

    #[test]
    fn test_reason_serializes_as_code() {
        let json = serde_json::to_string(&PrecheckResult::fail(PrecheckReason::TooFewLetters)).unwrap();
        assert_eq!(json, r#"{"valid":false,"reason":"TooFewLetters"}"#);
        assert_eq!(
            serde_json::to_string(&PrecheckResult::pass()).unwrap(),
            r#"{"valid":true}"#
        );
    }

    proptest! {
        #[test]
        fn prop_digit_or_symbol_is_invalid(
            prefix in "[A-Za-z]{0,8}",
            bad in "[0-9!@#$%^&*()_+=~`'\"<>?/\\\\|,;:{}\\[\\]]",
            suffix in "[A-Za-z]{0,8}",
        ) {
            let raw = format!("{prefix}{bad}{suffix}");
            prop_assert_eq!(check(&raw).reason, Some(PrecheckReason::InvalidCharacters));
        }

        #[test]
        fn prop_under_three_letters_is_rejected(letters in "[A-Za-z]{1,2}", pad in "[ .-]{0,3}") {
            let raw = format!("{letters}{pad}");
            prop_assert_eq!(check(&raw).reason, Some(PrecheckReason::TooFewLetters));
        }
    }
}
