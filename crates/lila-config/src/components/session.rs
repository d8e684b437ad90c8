//! Session persistence and logging configuration

use super::defaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the browser-session equivalent identifier is kept
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// File holding the session id; defaults to `<data_dir>/lila/session_id`
    pub id_file: Option<PathBuf>,
}

impl SessionConfig {
    /// Resolved location of the session id file
    pub fn id_file(&self) -> PathBuf {
        self.id_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lila")
                .join("session_id")
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter level (off, error, warn, info, debug, trace)
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    defaults::DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_id_file_wins() {
        let config = SessionConfig {
            id_file: Some(PathBuf::from("/tmp/lila-session")),
        };
        assert_eq!(config.id_file(), PathBuf::from("/tmp/lila-session"));
    }

    #[test]
    fn test_default_id_file_name() {
        let path = SessionConfig::default().id_file();
        assert!(path.ends_with("lila/session_id"));
    }
}
