//! One-shot HomePort qualification

use super::{attach_file, build_session, exit_code};
use anyhow::Result;
use lila_config::LilaConfig;
use lila_core::Mode;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

pub async fn execute(config: LilaConfig, path: PathBuf) -> Result<ExitCode> {
    let mut session = build_session(&config, Some(Mode::Homeport))?;
    if !attach_file(&mut session, &path).await? {
        return Ok(ExitCode::FAILURE);
    }

    info!(path = %path.display(), "running HomePort analysis");
    let outcome = session.submit("").await;
    Ok(exit_code(&outcome))
}
