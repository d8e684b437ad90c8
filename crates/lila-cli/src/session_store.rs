//! Persistent session identity
//!
//! The session id is generated once and reused across runs, so the backend
//! sees the same user between launches.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Read the stored session id, creating and saving a new one when absent
pub fn load_or_create(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => {
            debug!(path = %path.display(), "reusing stored session id");
            return Ok(contents.trim().to_string());
        }
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    }

    let id = Uuid::new_v4().simple().to_string();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, &id).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "created new session id");
    Ok(id)
}
