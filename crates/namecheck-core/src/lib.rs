//! # namecheck-core
//!
//! Deterministic half of the name classification pipeline.
//!
//! This crate answers the cheap questions about a submitted name without
//! any I/O:
//! - What does the name look like once normalized?
//! - Is it structurally impossible as a human name?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No remote calls**: All checks are regex and character-class rules
//! 3. **Traceable**: Every local rejection names the rule that fired
//!
//! ## Example
//!
//! ```rust
//! use namecheck_core::{precheck_name, LocalOutcome, PrecheckReason};
//!
//! match precheck_name("  m.ahmed ").unwrap() {
//!     LocalOutcome::Rejected(classification) => {
//!         assert_eq!(classification.name, "M.ahmed");
//!         assert_eq!(
//!             classification.verdict.reason(),
//!             Some(PrecheckReason::InvalidDotFormatting.message())
//!         );
//!     }
//!     LocalOutcome::NeedsModel(_) => unreachable!(),
//! }
//! ```

pub mod candidate;
pub mod precheck;
pub mod verdict;

pub use candidate::{normalize, CandidateError, NameCandidate};
pub use precheck::{precheck, precheck_str, PrecheckReason, PrecheckResult, MIN_LETTERS};
pub use verdict::{Classification, DecisionSource, Verdict, NOT_REALISTIC, REALISTIC};

/// Result of the local stages of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalOutcome {
    /// A pre-check rule rejected the name; this is already final.
    Rejected(Classification),

    /// The name passed every local rule and needs the remote model.
    NeedsModel(NameCandidate),
}

/// Normalize and pre-check raw input.
///
/// Returns [`CandidateError::EmptyName`] for empty or whitespace-only input.
pub fn precheck_name(raw: &str) -> Result<LocalOutcome, CandidateError> {
    let candidate = NameCandidate::new(raw)?;
    let result = precheck(&candidate);

    Ok(match result.reason {
        Some(rule) => LocalOutcome::Rejected(Classification::from_precheck(
            candidate.normalized(),
            rule,
        )),
        None => LocalOutcome::NeedsModel(candidate),
    })
}
