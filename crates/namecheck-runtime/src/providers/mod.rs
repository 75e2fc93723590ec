//! LLM provider abstractions for namecheck-runtime.
//!
//! The orchestrator only ever talks to the remote model through
//! [`LlmProvider`]. Production uses the OpenAI-compatible provider; tests
//! inject scripted providers.
//!
//! ## Security
//!
//! Providers hold their key in an [`ApiCredential`], which never renders
//! its value through `Debug` or `Display`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub mod secrets;

#[cfg(feature = "openai")]
mod openai;

pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "openai")]
pub use openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL, OPENAI_API_KEY_ENV};

/// Errors from LLM providers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }
}

/// Decoding parameters sent with one classification call.
///
/// Built per request from the runtime configuration; there is no default
/// model at this layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Sampling temperature; 0.0 keeps verdicts repeatable.
    pub temperature: f32,
    pub timeout: Duration,
}

/// Speaker of a prompt message. Classification prompts never replay a
/// model turn, so only the two request-side roles exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message of a classification prompt, serialized as the
/// chat-completions `{"role", "content"}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Raw model reply plus the metadata logged alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Unparsed reply text; the reply parser owns its interpretation.
    pub content: String,
    pub usage: TokenUsage,
    /// Model reported by the endpoint, which may differ from the one asked for.
    pub model: String,
    pub stop_reason: Option<String>,
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Remote-call capability injected into the classifier.
///
/// Built once at process start and shared by every request. This is the
/// only place remote model calls are made.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a chat completion.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Whether the provider can currently serve calls. Backs `/health`.
    async fn health_check(&self) -> bool;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
