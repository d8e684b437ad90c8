//! Attachment Manager
//!
//! Holds at most one pending file. Validation is all-or-nothing: a rejected
//! file never replaces the current attachment.

use crate::error::ValidationError;
use bytes::Bytes;
use lila_config::AttachmentConfig;
use std::path::Path;
use tracing::debug;

const MEGABYTE: u64 = 1024 * 1024;

/// Lifecycle of the pending file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentStatus {
    Unattached,
    Selected,
    Uploading,
    Uploaded,
    Failed,
}

/// A validated file waiting to be sent with the next turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    extension: String,
    bytes: Bytes,
    status: AttachmentStatus,
}

impl Attachment {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased extension without the dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Raw file contents (cheap to clone)
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn status(&self) -> AttachmentStatus {
        self.status
    }

    /// MIME type sent with multipart uploads
    pub fn mime_type(&self) -> &'static str {
        match self.extension.as_str() {
            "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "xls" => "application/vnd.ms-excel",
            "csv" => "text/csv",
            _ => "application/octet-stream",
        }
    }
}

/// Accepted extensions and size ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
    accepted_extensions: Vec<String>,
    max_bytes: u64,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::from_config(&AttachmentConfig::default())
    }
}

impl AttachmentPolicy {
    pub fn new<I, S>(accepted_extensions: I, max_bytes: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            accepted_extensions: accepted_extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_bytes,
        }
    }

    pub fn from_config(config: &AttachmentConfig) -> Self {
        Self {
            accepted_extensions: config.normalized_extensions(),
            max_bytes: config.max_bytes(),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn accepted_extensions(&self) -> &[String] {
        &self.accepted_extensions
    }

    /// Check a candidate file, returning its normalized extension
    pub fn validate(&self, name: &str, size: u64) -> Result<String, ValidationError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| self.accepted_extensions.iter().any(|accepted| accepted == ext))
            .ok_or_else(|| ValidationError::UnsupportedExtension {
                name: name.to_string(),
                accepted: self
                    .accepted_extensions
                    .iter()
                    .map(|ext| format!(".{}", ext))
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        if size > self.max_bytes {
            return Err(ValidationError::TooLarge {
                name: name.to_string(),
                size,
                limit_mb: self.max_bytes / MEGABYTE,
            });
        }

        Ok(extension)
    }
}

/// Owner of the single attachment slot
#[derive(Debug, Default)]
pub struct AttachmentManager {
    policy: AttachmentPolicy,
    current: Option<Attachment>,
}

impl AttachmentManager {
    pub fn new(policy: AttachmentPolicy) -> Self {
        Self {
            policy,
            current: None,
        }
    }

    pub fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    /// Validate and stage a file, replacing any existing attachment
    pub fn select(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Result<&Attachment, ValidationError> {
        let name = name.into();
        let bytes = bytes.into();
        let extension = self.policy.validate(&name, bytes.len() as u64)?;

        debug!(name = %name, bytes = bytes.len(), "attachment staged");
        Ok(self.current.insert(Attachment {
            name,
            extension,
            bytes,
            status: AttachmentStatus::Selected,
        }))
    }

    /// Remove the attachment; calling this on an empty slot is a no-op
    pub fn clear(&mut self) -> Option<Attachment> {
        let removed = self.current.take();
        if let Some(attachment) = &removed {
            debug!(name = %attachment.name, "attachment cleared");
        }
        removed
    }

    pub fn current(&self) -> Option<&Attachment> {
        self.current.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.current.is_some()
    }

    pub fn status(&self) -> AttachmentStatus {
        self.current
            .as_ref()
            .map_or(AttachmentStatus::Unattached, |a| a.status)
    }

    pub(crate) fn set_status(&mut self, status: AttachmentStatus) {
        if let Some(attachment) = self.current.as_mut() {
            attachment.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AttachmentManager {
        AttachmentManager::new(AttachmentPolicy::new(["xlsx", "xls"], 5 * MEGABYTE))
    }

    #[test]
    fn test_rejects_six_megabytes() {
        let mut manager = manager();
        let err = manager
            .select("big.xlsx", vec![0u8; 6 * MEGABYTE as usize])
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { limit_mb: 5, .. }));
        assert!(manager.current().is_none());
    }

    #[test]
    fn test_accepts_just_under_ceiling() {
        let mut manager = manager();
        let size = (4.9 * MEGABYTE as f64) as usize;
        let attachment = manager.select("loan.xlsx", vec![0u8; size]).unwrap();
        assert_eq!(attachment.size(), size as u64);
        assert_eq!(attachment.status(), AttachmentStatus::Selected);
    }

    #[test]
    fn test_rejects_csv() {
        let mut manager = manager();
        let err = manager.select("rates.csv", b"a,b\n1,2\n".to_vec()).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedExtension { .. }));
        assert!(err.to_string().contains(".xlsx, .xls"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let mut manager = manager();
        let attachment = manager.select("Ticket.XLS", b"data".to_vec()).unwrap();
        assert_eq!(attachment.extension(), "xls");
        assert_eq!(attachment.mime_type(), "application/vnd.ms-excel");
    }

    #[test]
    fn test_missing_extension_rejected() {
        let mut manager = manager();
        assert!(manager.select("xlsx", b"data".to_vec()).is_err());
    }

    #[test]
    fn test_rejected_select_keeps_previous() {
        let mut manager = manager();
        manager.select("first.xlsx", b"one".to_vec()).unwrap();
        manager.select("second.pdf", b"two".to_vec()).unwrap_err();
        assert_eq!(manager.current().unwrap().name(), "first.xlsx");
    }

    #[test]
    fn test_select_replaces_existing() {
        let mut manager = manager();
        manager.select("first.xlsx", b"one".to_vec()).unwrap();
        manager.select("second.xlsx", b"two".to_vec()).unwrap();
        assert_eq!(manager.current().unwrap().name(), "second.xlsx");
    }

    #[test]
    fn test_clear_twice_is_harmless() {
        let mut manager = manager();
        assert!(manager.clear().is_none());
        assert!(manager.clear().is_none());
        assert!(manager.current().is_none());
        assert_eq!(manager.status(), AttachmentStatus::Unattached);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = AttachmentPolicy::from_config(&AttachmentConfig::default());
        assert_eq!(policy.max_bytes(), 5 * MEGABYTE);
        assert_eq!(policy.accepted_extensions(), ["xlsx", "xls"]);
    }
}
