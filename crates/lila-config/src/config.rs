//! Top-level configuration and loading

use crate::components::{
    AttachmentConfig, BackendConfig, ChatConfig, LoggingConfig, SessionConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding `backend.base_url`
pub const ENV_BASE_URL: &str = "LILA_BASE_URL";
/// Environment variable overriding `attachments.max_size_mb`
pub const ENV_MAX_ATTACHMENT_MB: &str = "LILA_MAX_ATTACHMENT_MB";

/// Errors from loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that could not be parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },

    /// A value failed validation
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LilaConfig {
    /// Backend endpoints
    #[serde(default)]
    pub backend: BackendConfig,
    /// Attachment acceptance policy
    #[serde(default)]
    pub attachments: AttachmentConfig,
    /// Chat presentation
    #[serde(default)]
    pub chat: ChatConfig,
    /// Session id persistence
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging defaults
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LilaConfig {
    /// Default config file location (`<config_dir>/lila/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lila").join("config.toml"))
    }

    /// Load configuration, apply environment overrides and validate
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => {
                    debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            debug!(%url, "base_url overridden from environment");
            self.backend.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_MAX_ATTACHMENT_MB) {
            match raw.trim().parse::<u64>() {
                Ok(mb) => self.attachments.max_size_mb = mb,
                Err(_) => warn!(value = %raw, "ignoring non-numeric {}", ENV_MAX_ATTACHMENT_MB),
            }
        }
    }

    /// Check the values every component relies on
    pub fn validate(&self) -> ConfigResult<()> {
        let base = self.backend.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Invalid("backend.base_url is empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "backend.base_url must start with http:// or https://, got {}",
                base
            )));
        }
        if self.attachments.max_size_mb == 0 {
            return Err(ConfigError::Invalid(
                "attachments.max_size_mb must be greater than zero".to_string(),
            ));
        }
        if self.attachments.normalized_extensions().is_empty() {
            return Err(ConfigError::Invalid(
                "attachments.accepted_extensions must list at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}
