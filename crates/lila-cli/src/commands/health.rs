//! Backend reachability probe

use anyhow::{Context, Result};
use colored::Colorize;
use lila_client::HttpBackend;
use lila_config::LilaConfig;
use lila_core::ChatBackend;
use std::process::ExitCode;

pub async fn execute(config: LilaConfig) -> Result<ExitCode> {
    let backend = HttpBackend::new(&config.backend).context("Failed to create HTTP client")?;
    let url = config.backend.health_url();

    if backend.health_check().await? {
        println!("{} Backend reachable at {}", "✓".green(), url);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} Backend not reachable at {}", "✗".red(), url);
        Ok(ExitCode::FAILURE)
    }
}
