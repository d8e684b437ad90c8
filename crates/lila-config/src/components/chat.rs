//! Chat presentation and mode configuration

use super::defaults;
use serde::{Deserialize, Serialize};

/// Backend workflow selected at startup
///
/// Mirrors the runtime mode in `lila-core`; kept here so the config crate
/// stays free of domain dependencies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StartupMode {
    /// Streaming retail assistant
    #[default]
    Retail,
    /// Batch HomePort document analysis
    Homeport,
}

/// Chat configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// Name shown above assistant turns
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    /// Fixed mode label carried in every streaming request
    #[serde(default = "default_mode_label")]
    pub mode_label: String,
    /// Greeting rendered once when a session opens
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Mode the session starts in
    #[serde(default)]
    pub default_mode: StartupMode,
}

fn default_assistant_name() -> String {
    defaults::DEFAULT_ASSISTANT_NAME.to_string()
}

fn default_mode_label() -> String {
    defaults::DEFAULT_MODE_LABEL.to_string()
}

fn default_greeting() -> String {
    defaults::DEFAULT_GREETING.to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            mode_label: default_mode_label(),
            greeting: default_greeting(),
            default_mode: StartupMode::default(),
        }
    }
}
