//! Decision orchestrator for name classification.
//!
//! Sequences the pipeline for one request:
//!
//! ```text
//! Start ── normalize ──► empty? ──────────────────► Fail(EmptyName)
//!              │
//!              ▼
//!        model allowed? ── no ────────────────────► Fail(InvalidModel)
//!              │
//!              ▼
//!         pre-check ── rule fires ────────────────► Terminal(Not Realistic, rule)
//!              │
//!              ▼
//!      remote call (bounded) ── error/timeout ────► Fail(Remote)
//!              │
//!              ▼
//!        parse reply ── malformed / bad value ────► Fail(MalformedResponse | InvalidPrediction)
//!              │
//!              ▼
//!       Terminal(verdict)
//! ```
//!
//! The classifier holds no per-request state; one instance serves every
//! request concurrently. Remote failures are never retried here.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use namecheck_core::{precheck, CandidateError, Classification, NameCandidate};

use crate::config::{ConfigError, RuntimeConfig};
use crate::prompts::ClassificationRequest;
use crate::providers::{LlmProvider, ProviderError};
use crate::reply::{parse_reply, ReplyError};

/// Errors from the classification pipeline.
///
/// A "Not Realistic" verdict is never an error; these mean no verdict
/// could be reached.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("No name provided")]
    EmptyName,

    #[error("Invalid model. Choose from {allowed:?}")]
    InvalidModel { model: String, allowed: Vec<String> },

    #[error("Remote model call failed: {0}")]
    Remote(#[from] ProviderError),

    #[error("Invalid JSON response format from model: {detail}")]
    MalformedResponse { detail: String, raw: String },

    #[error("Invalid prediction value from model: {value:?}")]
    InvalidPrediction { value: Option<String>, raw: String },
}

impl ClassifyError {
    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ClassifyError::EmptyName | ClassifyError::InvalidModel { .. }
        )
    }

    /// True when the remote call did not finish in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClassifyError::Remote(e) if e.is_timeout())
    }

    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifyError::EmptyName => "empty_name",
            ClassifyError::InvalidModel { .. } => "invalid_model",
            ClassifyError::Remote(_) => "remote_error",
            ClassifyError::MalformedResponse { .. } => "malformed_response",
            ClassifyError::InvalidPrediction { .. } => "invalid_prediction",
        }
    }

    fn from_reply(err: ReplyError, raw: &str) -> Self {
        match err {
            ReplyError::Malformed { detail, .. } => ClassifyError::MalformedResponse {
                detail,
                raw: raw.to_string(),
            },
            ReplyError::InvalidPrediction { value } => ClassifyError::InvalidPrediction {
                value,
                raw: raw.to_string(),
            },
        }
    }
}

impl From<CandidateError> for ClassifyError {
    fn from(err: CandidateError) -> Self {
        match err {
            CandidateError::EmptyName => ClassifyError::EmptyName,
        }
    }
}

/// Inbound classification request.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ClassifyRequest {
    /// Raw name, possibly empty or untrimmed.
    #[serde(default)]
    pub name: String,

    /// Requested model; the configured default when absent.
    #[serde(default)]
    pub model: Option<String>,
}

impl ClassifyRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Runs the classification pipeline against an injected provider.
pub struct NameClassifier {
    provider: Arc<dyn LlmProvider>,
    config: RuntimeConfig,
}

impl std::fmt::Debug for NameClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameClassifier")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

impl NameClassifier {
    /// Create a classifier. The configuration is validated first.
    pub fn new(provider: Arc<dyn LlmProvider>, config: RuntimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Classify one request.
    pub async fn classify(&self, request: &ClassifyRequest) -> Result<Classification, ClassifyError> {
        let candidate = NameCandidate::new(request.name.as_str()).map_err(|e| {
            warn!("Received request with no name");
            ClassifyError::from(e)
        })?;
        debug!(raw = ?candidate.raw(), name = %candidate, "Normalized input");

        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        if !self.config.is_allowed(model) {
            warn!(name = %candidate, model = %model, "Invalid model requested");
            return Err(ClassifyError::InvalidModel {
                model: model.to_string(),
                allowed: self.config.allowed_models.clone(),
            });
        }

        let check = precheck(&candidate);
        if let Some(rule) = check.reason {
            info!(name = %candidate, reason = %rule, "Rejected by pre-check");
            return Ok(Classification::from_precheck(candidate.normalized(), rule));
        }

        info!(name = %candidate, model = %model, "Passed pre-check, asking remote model");
        let remote = ClassificationRequest::build(&candidate, model, &self.config);
        let raw = self.call_remote(&candidate, &remote).await?;

        debug!(name = %candidate, model = %model, reply = %raw, "Received raw reply");

        match parse_reply(&raw) {
            Ok(verdict) => {
                info!(
                    name = %candidate,
                    model = %model,
                    prediction = verdict.label(),
                    "Model verdict"
                );
                Ok(Classification::from_model(candidate.normalized(), model, verdict))
            }
            Err(e) => {
                error!(name = %candidate, model = %model, error = %e, reply = %raw, "Unusable model reply");
                Err(ClassifyError::from_reply(e, &raw))
            }
        }
    }

    /// Invoke the provider, bounded by the configured timeout.
    async fn call_remote(
        &self,
        candidate: &NameCandidate,
        request: &ClassificationRequest,
    ) -> Result<String, ClassifyError> {
        let timeout = request.timeout;
        let completion = request.completion_config();
        let call = self.provider.complete(request.messages(), &completion);

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(response)) => {
                debug!(
                    name = %candidate,
                    model = %response.model,
                    tokens = response.usage.total(),
                    stop_reason = ?response.stop_reason,
                    "Remote model call completed"
                );
                Ok(response.content.trim().to_string())
            }
            Ok(Err(e)) => {
                error!(
                    name = %candidate,
                    model = %request.model,
                    provider = self.provider.name(),
                    error = %e,
                    "Remote model call failed"
                );
                Err(ClassifyError::Remote(e))
            }
            Err(_) => {
                error!(
                    name = %candidate,
                    model = %request.model,
                    timeout = ?timeout,
                    "Remote model call timed out"
                );
                Err(ClassifyError::Remote(ProviderError::Timeout(timeout)))
            }
        }
    }
}

/// Builder for [`NameClassifier`].
pub struct NameClassifierBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: RuntimeConfig,
}

impl NameClassifierBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the remote-call capability.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<NameClassifier, ConfigError> {
        let provider = self
            .provider
            .ok_or_else(|| ConfigError::Invalid("No provider set".to_string()))?;
        NameClassifier::new(provider, self.config)
    }
}

impl Default for NameClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
