//! Instruction text sent to the remote model.
//!
//! Two wordings are available. Both end with the same output contract:
//! a JSON object whose `prediction` is exactly `"Realistic"` or
//! `"Not Realistic"`, with a `reason` of at most [`MAX_REASON_CHARS`]
//! characters only in the negative case.

use serde::{Deserialize, Serialize};

use namecheck_core::NameCandidate;

use crate::config::RuntimeConfig;
use crate::providers::{ChatMessage, CompletionConfig};

/// Upper bound on the length of a model-supplied reason.
pub const MAX_REASON_CHARS: usize = 50;

/// System message shared by every wording.
pub const SYSTEM_PROMPT: &str =
    "You are a precise name classification assistant outputting only JSON.";

/// Positive anchors for the compact wording.
pub const COMPACT_EXAMPLES: [&str; 7] = [
    "Mst Nodi",
    "Md Hafijul",
    "Mst Taslima",
    "Mr. Hanif Uddin",
    "Beauty",
    "Md Jewel",
    "Mst Sonia",
];

/// Positive anchors for the extended wording.
pub const EXTENDED_EXAMPLES: [&str; 8] = [
    "Mohiuddin Mohi",
    "Aisha Khan",
    "Sheik Kaykaus",
    "Mr. Hanif Uddin",
    "John-Doe",
    "Mary. Anne Smith",
    "m. a. h. hashan",
    "p. k. robi mullah",
];

/// Negative anchors for the extended wording, with the reason each fails.
pub const EXTENDED_COUNTER_EXAMPLES: [(&str, &str); 3] = [
    ("Abdullah123", "contains numbers"),
    ("Table Chair", "common phrase"),
    ("Qwert", "keyboard pattern"),
];

/// Instruction wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Short task statement plus positive examples.
    #[default]
    Compact,

    /// Expert framing with explicit criteria and both kinds of example.
    Extended,
}

impl PromptStyle {
    /// Built-in positive examples for this wording.
    pub fn default_examples(&self) -> &'static [&'static str] {
        match self {
            PromptStyle::Compact => &COMPACT_EXAMPLES,
            PromptStyle::Extended => &EXTENDED_EXAMPLES,
        }
    }
}

fn output_contract() -> String {
    format!(
        "Respond only with JSON:\n\
         - Realistic: {{\"prediction\":\"Realistic\"}}\n\
         - Not Realistic: {{\"prediction\":\"Not Realistic\",\"reason\":\"<max {} character reason>\"}}",
        MAX_REASON_CHARS
    )
}

fn quote_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| format!("'{}'", s.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compact instruction for `name`.
pub fn compact_instruction<S: AsRef<str>>(name: &str, examples: &[S]) -> String {
    format!(
        "Determine if the name '{name}' is a realistic human name. \
         Single-word names are allowed. Ignore the case.\n\
         Examples of realistic names: {examples}\n\n\
         {contract}",
        name = name,
        examples = quote_list(examples),
        contract = output_contract(),
    )
}

/// Extended instruction for `name`.
pub fn extended_instruction<S: AsRef<str>>(name: &str, examples: &[S]) -> String {
    let counter = EXTENDED_COUNTER_EXAMPLES
        .iter()
        .map(|(n, why)| format!("'{}' ({})", n, why))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an expert in name classification. Determine if the full name '{name}' \
         is a realistic human name, used in any culture. Single-word names are allowed. \
         Consider the name regardless of its capitalization.\n\n\
         A name is not realistic if:\n\
         * It is a common phrase or ordinary words rather than a name.\n\
         * It is a keyboard pattern or random letters.\n\
         * It resembles a username or email handle.\n\n\
         Examples of realistic names: {examples}\n\
         Examples of unrealistic names: {counter}\n\n\
         {contract}",
        name = name,
        examples = quote_list(examples),
        counter = counter,
        contract = output_contract(),
    )
}

/// One remote classification call, fully specified.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub model: String,
    pub system: String,
    pub instruction: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: std::time::Duration,
}

impl ClassificationRequest {
    /// Build the request for a candidate that passed the pre-check.
    ///
    /// `model` must already be on the allow-list.
    pub fn build(candidate: &NameCandidate, model: &str, config: &RuntimeConfig) -> Self {
        let name = candidate.normalized();
        let style = config.prompt.style;

        let instruction = if config.prompt.examples.is_empty() {
            let examples = style.default_examples();
            match style {
                PromptStyle::Compact => compact_instruction(name, examples),
                PromptStyle::Extended => extended_instruction(name, examples),
            }
        } else {
            let examples = &config.prompt.examples;
            match style {
                PromptStyle::Compact => compact_instruction(name, examples),
                PromptStyle::Extended => extended_instruction(name, examples),
            }
        };

        Self {
            model: model.to_string(),
            system: SYSTEM_PROMPT.to_string(),
            instruction,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.timeout,
        }
    }

    /// Chat messages in send order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.instruction.clone()),
        ]
    }

    /// Decoding parameters for the provider.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.timeout,
        }
    }
}
