//! One-shot Retail Channel question

use super::{attach_file, build_session, exit_code};
use anyhow::Result;
use lila_config::LilaConfig;
use lila_core::Mode;
use std::path::PathBuf;
use std::process::ExitCode;

pub async fn execute(config: LilaConfig, query: String, attach: Option<PathBuf>) -> Result<ExitCode> {
    let mut session = build_session(&config, Some(Mode::Retail))?;

    if let Some(path) = attach {
        if !attach_file(&mut session, &path).await? {
            return Ok(ExitCode::FAILURE);
        }
    }

    let outcome = session.submit(&query).await;
    Ok(exit_code(&outcome))
}
