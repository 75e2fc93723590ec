//! Classification verdicts.

use serde::{Deserialize, Serialize};

use crate::precheck::PrecheckReason;

/// Wire value of a positive prediction.
pub const REALISTIC: &str = "Realistic";

/// Wire value of a negative prediction.
pub const NOT_REALISTIC: &str = "Not Realistic";

/// Final classification of a candidate.
///
/// Serializes with a `prediction` tag, so a negative verdict renders as
/// `{"prediction":"Not Realistic","reason":"..."}` and a positive one as
/// `{"prediction":"Realistic"}`. A positive verdict has no reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "prediction")]
pub enum Verdict {
    #[serde(rename = "Realistic")]
    Realistic,

    #[serde(rename = "Not Realistic")]
    NotRealistic { reason: String },
}

impl Verdict {
    pub fn not_realistic(reason: impl Into<String>) -> Self {
        Verdict::NotRealistic {
            reason: reason.into(),
        }
    }

    pub fn is_realistic(&self) -> bool {
        matches!(self, Verdict::Realistic)
    }

    /// The wire label of this verdict.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Realistic => REALISTIC,
            Verdict::NotRealistic { .. } => NOT_REALISTIC,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Realistic => None,
            Verdict::NotRealistic { reason } => Some(reason),
        }
    }
}

impl From<PrecheckReason> for Verdict {
    fn from(reason: PrecheckReason) -> Self {
        Verdict::not_realistic(reason.message())
    }
}

/// Which stage produced a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum DecisionSource {
    /// Rejected locally by a pre-check rule.
    Precheck { rule: PrecheckReason },

    /// Decided by the remote model.
    Model { model: String },
}

/// A verdict together with the name it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Normalized candidate.
    pub name: String,

    #[serde(flatten)]
    pub verdict: Verdict,

    #[serde(skip)]
    pub source: DecisionSource,
}

impl Classification {
    pub fn from_precheck(name: impl Into<String>, rule: PrecheckReason) -> Self {
        Self {
            name: name.into(),
            verdict: Verdict::from(rule),
            source: DecisionSource::Precheck { rule },
        }
    }

    pub fn from_model(name: impl Into<String>, model: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            name: name.into(),
            verdict,
            source: DecisionSource::Model {
                model: model.into(),
            },
        }
    }

    /// True when no remote call was needed.
    pub fn is_local(&self) -> bool {
        matches!(self.source, DecisionSource::Precheck { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_realistic_has_no_reason() {
        let verdict = Verdict::Realistic;
        assert!(verdict.is_realistic());
        assert_eq!(verdict.reason(), None);
        assert_eq!(serde_json::to_value(&verdict).unwrap(), json!({"prediction": "Realistic"}));
    }

    #[test]
    fn test_not_realistic_wire_shape() {
        let verdict = Verdict::not_realistic("keyboard pattern");
        assert_eq!(verdict.label(), NOT_REALISTIC);
        assert_eq!(
            serde_json::to_value(&verdict).unwrap(),
            json!({"prediction": "Not Realistic", "reason": "keyboard pattern"})
        );
    }

    #[test]
    fn test_precheck_reason_becomes_verdict() {
        let verdict = Verdict::from(PrecheckReason::TooFewLetters);
        assert_eq!(verdict.reason(), Some("Too few letters"));
    }

    #[test]
    fn test_classification_flattens_verdict() {
        let local = Classification::from_precheck("Ku", PrecheckReason::TooFewLetters);
        assert!(local.is_local());
        assert_eq!(
            serde_json::to_value(&local).unwrap(),
            json!({"name": "Ku", "prediction": "Not Realistic", "reason": "Too few letters"})
        );

        let remote = Classification::from_model("Aisha Khan", "gpt-4o-mini", Verdict::Realistic);
        assert!(!remote.is_local());
        assert_eq!(
            serde_json::to_value(&remote).unwrap(),
            json!({"name": "Aisha Khan", "prediction": "Realistic"})
        );
    }
}
