//! Server configuration

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use namecheck_runtime::{ConfigError, RuntimeConfig, DEFAULT_OPENAI_BASE_URL};

#[derive(Error, Debug)]
pub enum ServerConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid listen address {0}")]
    Address(String),

    #[error(transparent)]
    Runtime(#[from] ConfigError),
}

/// Server configuration
///
/// ```yaml
/// listen: 0.0.0.0
/// port: 5000
/// base_url: https://api.openai.com/v1
/// runtime:
///   default_model: gpt-4o-mini
///   timeout: 15s
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub listen: String,

    /// Listen port
    pub port: u16,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Classification pipeline settings
    pub runtime: RuntimeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0".to_string(),
            port: 5000,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// Values given on the command line or through the environment.
///
/// Each `Some` replaces the corresponding file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub base_url: Option<String>,
    pub default_model: Option<String>,
    pub timeout: Option<Duration>,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(config_path: &str, overrides: &ConfigOverrides) -> Result<Self, ServerConfigError> {
        let mut config = if Path::new(config_path).exists() {
            let content =
                std::fs::read_to_string(config_path).map_err(|source| ServerConfigError::Io {
                    path: config_path.to_string(),
                    source,
                })?;
            serde_yaml::from_str(&content).map_err(|source| ServerConfigError::Yaml {
                path: config_path.to_string(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply(overrides);
        config.runtime.validate()?;
        Ok(config)
    }

    fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(listen) = &overrides.listen {
            self.listen = listen.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(base_url) = &overrides.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(model) = &overrides.default_model {
            self.runtime.default_model = model.clone();
        }
        if let Some(timeout) = overrides.timeout {
            self.runtime.timeout = timeout;
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerConfigError> {
        let ip: IpAddr = self
            .listen
            .trim()
            .parse()
            .map_err(|_| ServerConfigError::Address(self.listen.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load("/nonexistent/namecheck.yaml", &ConfigOverrides::default())
            .unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().unwrap().port(), 5000);
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "port: 6000\nruntime:\n  default_model: gpt-4.1\n  timeout: 5s"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = ServerConfig::load(path, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.runtime.default_model, "gpt-4.1");
        assert_eq!(config.runtime.timeout, Duration::from_secs(5));

        let overrides = ConfigOverrides {
            port: Some(7000),
            default_model: Some("gpt-4.1-nano".to_string()),
            ..ConfigOverrides::default()
        };
        let config = ServerConfig::load(path, &overrides).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.runtime.default_model, "gpt-4.1-nano");
    }

    #[test]
    fn test_override_is_validated() {
        let overrides = ConfigOverrides {
            default_model: Some("gpt-3.5-turbo".to_string()),
            ..ConfigOverrides::default()
        };
        let err = ServerConfig::load("/nonexistent/namecheck.yaml", &overrides).unwrap_err();
        assert!(matches!(err, ServerConfigError::Runtime(_)));
    }

    #[test]
    fn test_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: [not a port]").unwrap();
        let err = ServerConfig::load(file.path().to_str().unwrap(), &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ServerConfigError::Yaml { .. }));
    }

    #[test]
    fn test_bad_listen_address() {
        let config = ServerConfig {
            listen: "not an address".to_string(),
            ..ServerConfig::default()
        };
        let err = config.socket_addr().unwrap_err();
        assert!(matches!(err, ServerConfigError::Address(ref listen) if listen == "not an address"));
    }

    #[test]
    fn test_ipv6_listen_address() {
        let config = ServerConfig {
            listen: "::".to_string(),
            ..ServerConfig::default()
        };
        let addr = config.socket_addr().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.port(), 5000);
        assert_eq!(addr.to_string(), "[::]:5000");
    }
}
