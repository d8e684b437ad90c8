//! Attachment acceptance policy

use super::defaults;
use serde::{Deserialize, Serialize};

/// Which files may be staged for a turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentConfig {
    /// Accepted file extensions, compared case-insensitively
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,
    /// Size ceiling in megabytes (1 MB = 1024 * 1024 bytes)
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
}

fn default_accepted_extensions() -> Vec<String> {
    defaults::DEFAULT_ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_max_size_mb() -> u64 {
    defaults::DEFAULT_MAX_ATTACHMENT_MB
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            accepted_extensions: default_accepted_extensions(),
            max_size_mb: default_max_size_mb(),
        }
    }
}

impl AttachmentConfig {
    /// Ceiling in bytes
    pub fn max_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    /// Extensions lower-cased with any leading dot removed
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.accepted_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceiling_is_five_megabytes() {
        assert_eq!(AttachmentConfig::default().max_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = AttachmentConfig {
            accepted_extensions: vec![".XLSX".to_string(), " xls ".to_string(), ".".to_string()],
            max_size_mb: 5,
        };
        assert_eq!(config.normalized_extensions(), vec!["xlsx", "xls"]);
    }
}
