//! Name candidates and input normalization.

use std::fmt;
use thiserror::Error;

/// Errors raised while turning raw input into a candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("No name provided")]
    EmptyName,
}

/// Normalize raw input text.
///
/// Runs of whitespace collapse to a single space, leading and trailing
/// whitespace is dropped, and every token is rewritten with an upper-case
/// first character and a lower-case remainder. Case mapping is ASCII only;
/// any other character passes through untouched.
///
/// # Example
///
/// ```
/// use namecheck_core::normalize;
///
/// assert_eq!(normalize("  mr.   HANIF uddin "), "Mr. Hanif Uddin");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(capitalize_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_token(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(token.len());
            out.push(first.to_ascii_uppercase());
            out.extend(chars.map(|c| c.to_ascii_lowercase()));
            out
        }
        None => String::new(),
    }
}

/// A name under evaluation.
///
/// Immutable once built. Holds the raw input, its normalized form and the
/// ASCII letters of the normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    raw: String,
    normalized: String,
    letters: String,
}

impl NameCandidate {
    /// Normalize `raw` into a candidate.
    ///
    /// Returns [`CandidateError::EmptyName`] when nothing but whitespace
    /// was supplied.
    pub fn new(raw: impl Into<String>) -> Result<Self, CandidateError> {
        let raw = raw.into();
        let normalized = normalize(&raw);
        if normalized.is_empty() {
            return Err(CandidateError::EmptyName);
        }

        let letters = normalized
            .chars()
            .filter(char::is_ascii_alphabetic)
            .collect();

        Ok(Self {
            raw,
            normalized,
            letters,
        })
    }

    /// The input exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized form used by every later stage.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// ASCII letters of the normalized form, in order.
    pub fn letters(&self) -> &str {
        &self.letters
    }

    /// Number of ASCII letters.
    pub fn letter_count(&self) -> usize {
        self.letters.len()
    }
}

impl fmt::Display for NameCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}
