//! Parsing and validation of the remote model's reply.
//!
//! The model produces TEXT, not verdicts. The text is converted into a
//! [`Verdict`] only after it passes every check below; anything else is an
//! error, never a best-effort guess.
//!
//! # Steps
//! 1. Extract the payload: a ```` ```json ```` fenced block if present,
//!    otherwise the whole trimmed reply
//! 2. Parse it as JSON ([`ReplyError::Malformed`] on failure)
//! 3. Require an object whose `prediction` is one of the two literals
//!    ([`ReplyError::InvalidPrediction`] otherwise)
//! 4. A positive verdict stops here; any `reason` is dropped unread
//! 5. A negative verdict is checked against the reply schema
//!    ([`ReplyError::Malformed`]) and keeps a bounded `reason` or falls
//!    back to [`MISSING_REASON`]

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

use namecheck_core::{Verdict, NOT_REALISTIC, REALISTIC};

use crate::prompts::MAX_REASON_CHARS;

/// Reason attached to a negative verdict when the model gave none.
pub const MISSING_REASON: &str = "Reason not provided by model";

/// JSON Schema for a well-formed reply.
const REPLY_SCHEMA_JSON: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "type": "object",
  "required": ["prediction"],
  "properties": {
    "prediction": { "type": "string", "enum": ["Realistic", "Not Realistic"] },
    "reason": { "type": ["string", "null"] }
  }
}"#;

static REPLY_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

lazy_static! {
    /// A ```json fenced block wrapping a single object.
    static ref JSON_FENCE: Regex = Regex::new(r"(?is)```json\s*(\{.*?\})\s*```").unwrap();
}

/// Errors from reply validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplyError {
    #[error("Malformed reply: {detail}")]
    Malformed { detail: String, payload: String },

    #[error("Invalid prediction value from model: {value:?}")]
    InvalidPrediction { value: Option<String> },
}

/// Pull the JSON payload out of a raw reply.
///
/// Returns the body of the first ```` ```json ```` fence, or the trimmed
/// reply when there is no fence.
pub fn extract_payload(raw: &str) -> &str {
    JSON_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| raw.trim())
}

/// Parse and validate a raw reply into a verdict.
pub fn parse_reply(raw: &str) -> Result<Verdict, ReplyError> {
    let payload = extract_payload(raw);

    let value: Value = serde_json::from_str(payload).map_err(|e| ReplyError::Malformed {
        detail: format!("not valid JSON: {}", e),
        payload: payload.to_string(),
    })?;

    let object = value.as_object().ok_or_else(|| ReplyError::Malformed {
        detail: "expected a JSON object".to_string(),
        payload: payload.to_string(),
    })?;

    let prediction = match object.get("prediction") {
        Some(Value::String(s)) if s == REALISTIC || s == NOT_REALISTIC => s.as_str(),
        Some(Value::String(s)) => {
            return Err(ReplyError::InvalidPrediction {
                value: Some(s.clone()),
            })
        }
        Some(other) => {
            return Err(ReplyError::InvalidPrediction {
                value: Some(other.to_string()),
            })
        }
        None => return Err(ReplyError::InvalidPrediction { value: None }),
    };

    if prediction == REALISTIC {
        return Ok(Verdict::Realistic);
    }

    validate_schema(&value).map_err(|detail| ReplyError::Malformed {
        detail,
        payload: payload.to_string(),
    })?;

    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(bound_reason)
        .unwrap_or_else(|| MISSING_REASON.to_string());

    Ok(Verdict::NotRealistic { reason })
}

fn bound_reason(reason: &str) -> String {
    if reason.chars().count() <= MAX_REASON_CHARS {
        return reason.to_string();
    }
    tracing::warn!(
        length = reason.chars().count(),
        max = MAX_REASON_CHARS,
        "Model reason exceeds limit, truncating"
    );
    reason.chars().take(MAX_REASON_CHARS).collect()
}

fn reply_validator() -> Result<&'static jsonschema::Validator, String> {
    let compiled = REPLY_SCHEMA.get_or_init(|| {
        let schema: Value = serde_json::from_str(REPLY_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;
        jsonschema::options()
            .build(&schema)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });
    compiled.as_ref().map_err(|e| e.clone())
}

fn validate_schema(value: &Value) -> Result<(), String> {
    let validator = reply_validator()?;
    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
