//! # namecheck-runtime
//!
//! Model-assisted half of the name classification pipeline.
//!
//! `namecheck-core` rejects names that are structurally impossible. Names
//! that survive are sent to a remote language model, whose free-text reply
//! is validated before it becomes a verdict.
//!
//! ## Components
//!
//! - [`config`]: allow-list, default model, decoding parameters, timeout
//! - [`prompts`]: instruction wording and the outbound request
//! - [`providers`]: the [`LlmProvider`] seam and the OpenAI-compatible client
//! - [`reply`]: strict parsing of the model's reply
//! - [`orchestrator`]: [`NameClassifier`], which sequences all of the above
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use namecheck_runtime::{ClassifyRequest, NameClassifier, OpenAiProvider, RuntimeConfig};
//!
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//! let classifier = NameClassifier::new(provider, RuntimeConfig::default())?;
//!
//! let result = classifier
//!     .classify(&ClassifyRequest::new("aisha khan").with_model("gpt-4.1-mini"))
//!     .await?;
//! println!("{} -> {}", result.name, result.verdict.label());
//! ```

pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod reply;

pub use config::{ConfigError, PromptConfig, RuntimeConfig, DEFAULT_ALLOWED_MODELS, DEFAULT_MODEL};
pub use orchestrator::{ClassifyError, ClassifyRequest, NameClassifier, NameClassifierBuilder};
pub use prompts::{ClassificationRequest, PromptStyle, MAX_REASON_CHARS};
pub use providers::{
    ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, CredentialSource,
    LlmProvider, ProviderError, Role, TokenUsage,
};
pub use reply::{parse_reply, ReplyError, MISSING_REASON};

#[cfg(feature = "openai")]
pub use providers::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL, OPENAI_API_KEY_ENV};
