//! Backend endpoint configuration

use super::defaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the relay backend lives and which paths it serves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    /// Scheme, host and port of the backend, without a trailing path
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Streaming chat endpoint path
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
    /// Upload handshake endpoint path
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    /// Document analysis endpoint path
    #[serde(default = "default_analyze_path")]
    pub analyze_path: String,
    /// Liveness probe path
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Per-request timeout in seconds
    ///
    /// Unset means requests may block indefinitely, which is the historical
    /// behavior of the browser client.
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    defaults::DEFAULT_BASE_URL.to_string()
}

fn default_chat_path() -> String {
    defaults::DEFAULT_CHAT_PATH.to_string()
}

fn default_upload_path() -> String {
    defaults::DEFAULT_UPLOAD_PATH.to_string()
}

fn default_analyze_path() -> String {
    defaults::DEFAULT_ANALYZE_PATH.to_string()
}

fn default_health_path() -> String {
    defaults::DEFAULT_HEALTH_PATH.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_path: default_chat_path(),
            upload_path: default_upload_path(),
            analyze_path: default_analyze_path(),
            health_path: default_health_path(),
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    /// Full URL of the streaming chat endpoint
    pub fn chat_url(&self) -> String {
        self.join(&self.chat_path)
    }

    /// Full URL of the upload handshake endpoint
    pub fn upload_url(&self) -> String {
        self.join(&self.upload_path)
    }

    /// Full URL of the analysis endpoint
    pub fn analyze_url(&self) -> String {
        self.join(&self.analyze_path)
    }

    /// Full URL of the liveness probe
    pub fn health_url(&self) -> String {
        self.join(&self.health_path)
    }

    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn join(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}
