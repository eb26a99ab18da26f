//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calbridge/config.toml` by default.
//!
//! The Google `access_token` may hold the token or a `pass::`/`env::`
//! reference to it (see [`crate::secret`]).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[cfg(feature = "google")]
use crate::error::{ClientError, ClientResult};
#[cfg(feature = "google")]
use crate::secret::{SecretError, TokenSource};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the calbridge client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google Calendar settings.
    #[cfg(feature = "google")]
    pub google: Option<GoogleSettings>,

    /// Debug mode.
    pub debug: bool,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logging output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `pretty`, `compact` or `json`.
    pub format: String,

    /// Filter directive overriding the default level (e.g. `calbridge=debug`).
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
            filter: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calbridge")
    }
}

// ---------------------------------------------------------------------------
// GoogleSettings (in config.toml, including the access token)
// ---------------------------------------------------------------------------

/// Google Calendar backend settings.
#[cfg(feature = "google")]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleSettings {
    /// OAuth access token (supports `pass::` and `env::` prefixes).
    pub access_token: Option<String>,

    /// Calendar API base URL.
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request.
    pub user_agent: Option<String>,
}

#[cfg(feature = "google")]
impl GoogleSettings {
    /// Converts to remote configuration.
    ///
    /// Resolves the access token and validates the result.
    pub fn to_remote_config(&self) -> ClientResult<calbridge_providers::google::GoogleConfig> {
        use calbridge_providers::google::GoogleConfig;

        let mut config = GoogleConfig::new(self.resolve_access_token()?);

        if let Some(ref base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(std::time::Duration::from_secs(secs));
        }
        if let Some(ref user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }

        config
            .validate()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Resolves the access token, following `pass::`/`env::` references.
    pub(crate) fn resolve_access_token(&self) -> Result<String, SecretError> {
        let raw = self
            .access_token
            .as_deref()
            .ok_or_else(|| SecretError::Missing {
                config_path: ClientConfig::default_path().display().to_string(),
            })?;
        TokenSource::parse(raw).resolve()
    }
}
