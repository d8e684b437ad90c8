pub mod analyze;
pub mod ask;
pub mod chat;
pub mod health;

use crate::render::TerminalRenderer;
use crate::session_store;
use anyhow::{Context, Result};
use lila_client::HttpBackend;
use lila_config::LilaConfig;
use lila_core::{
    AttachmentManager, AttachmentPolicy, ChatSession, ConversationContext, Mode, SessionOptions,
};
use std::path::Path;
use std::process::ExitCode;

pub type TerminalSession = ChatSession<HttpBackend, TerminalRenderer<std::io::Stdout>>;

/// Wire the HTTP backend, terminal renderer and stored session id together
pub fn build_session(config: &LilaConfig, mode: Option<Mode>) -> Result<TerminalSession> {
    let backend = HttpBackend::new(&config.backend).context("Failed to create HTTP client")?;
    let session_id = session_store::load_or_create(&config.session.id_file())?;

    let mut options = SessionOptions::from_config(&config.chat);
    if let Some(mode) = mode {
        options.initial_mode = mode;
    }

    Ok(ChatSession::new(
        backend,
        TerminalRenderer::stdout(config.chat.assistant_name.clone()),
        ConversationContext::new(session_id),
        AttachmentManager::new(AttachmentPolicy::from_config(&config.attachments)),
        options,
    ))
}

/// Read a file from disk and stage it on the session
///
/// The name and size are checked before the contents are read. Returns false
/// when the file was rejected; the renderer has already shown why.
pub async fn attach_file<B, R>(session: &mut ChatSession<B, R>, path: &Path) -> Result<bool>
where
    B: lila_core::ChatBackend,
    R: lila_core::Renderer,
{
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file: {}", path.display()))?;
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("Not a file: {}", path.display());
    }
    if session.check_attachment(&name, metadata.len()).is_err() {
        return Ok(false);
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(session.select_attachment(name, bytes).is_ok())
}

pub(crate) fn exit_code(outcome: &lila_core::TurnOutcome) -> ExitCode {
    match outcome {
        lila_core::TurnOutcome::Completed(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
