use anyhow::{Context, Result};
use lila_config::LilaConfig;
use std::path::PathBuf;
use tracing::debug;

/// Load configuration with CLI overrides applied last
///
/// Precedence for the backend URL: `--base-url`, then `LILA_BASE_URL`, then
/// the config file, then the built-in default.
pub fn load(path: Option<PathBuf>, base_url: Option<String>) -> Result<LilaConfig> {
    let mut config = LilaConfig::load(path.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = base_url {
        debug!(%url, "base_url overridden from command line");
        config.backend.base_url = url;
        config.validate().context("Invalid --base-url")?;
    }

    Ok(config)
}
