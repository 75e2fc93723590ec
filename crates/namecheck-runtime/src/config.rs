//! Runtime configuration.
//!
//! Loaded from YAML (usually nested under `runtime:` in the server config)
//! or built in code. Every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```yaml
//! allowed_models: [gpt-4.1, gpt-4.1-mini, gpt-4.1-nano, gpt-4o-mini]
//! default_model: gpt-4o-mini
//! temperature: 0.0
//! max_tokens: 60
//! timeout: 15s
//! prompt:
//!   style: compact
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::prompts::PromptStyle;

/// Remote models a caller may select.
pub const DEFAULT_ALLOWED_MODELS: [&str; 4] =
    ["gpt-4.1", "gpt-4.1-mini", "gpt-4.1-nano", "gpt-4o-mini"];

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the classification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Allow-list of remote model identifiers
    pub allowed_models: Vec<String>,

    /// Model used when the request omits one
    pub default_model: String,

    /// Sampling temperature (0.0 for deterministic)
    pub temperature: f32,

    /// Cap on generated tokens
    pub max_tokens: u32,

    /// Bound on a single remote call
    #[serde(with = "duration_str")]
    pub timeout: Duration,

    /// Instruction wording
    pub prompt: PromptConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            allowed_models: DEFAULT_ALLOWED_MODELS.iter().map(|m| m.to_string()).collect(),
            default_model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: 60,
            timeout: Duration::from_secs(15),
            prompt: PromptConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_models.is_empty() {
            return Err(ConfigError::Invalid("allowed_models must not be empty".into()));
        }
        if !self.is_allowed(&self.default_model) {
            return Err(ConfigError::Invalid(format!(
                "default_model '{}' is not in allowed_models {:?}",
                self.default_model, self.allowed_models
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be greater than 0".into()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than 0".into()));
        }
        Ok(())
    }

    /// Whether `model` is on the allow-list.
    pub fn is_allowed(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }

    /// Builder-style setter for the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Builder-style setter for the remote-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Which instruction wording to send and which examples to anchor it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptConfig {
    pub style: PromptStyle,

    /// Overrides the style's built-in positive examples when non-empty.
    pub examples: Vec<String>,
}

/// Durations as humantime strings ("15s", "500ms").
mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
