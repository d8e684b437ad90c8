//! Interactive chat REPL
//!
//! Plain lines are submitted as turns; lines starting with `/` are session
//! commands.

use super::{attach_file, build_session};
use anyhow::{Context, Result};
use colored::Colorize;
use lila_config::LilaConfig;
use lila_core::{AttachmentStatus, ChatBackend, ChatSession, Mode, Renderer, Role, TurnOutcome};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// A parsed `/command` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Mode(Mode),
    Attach(PathBuf),
    Detach,
    Status,
    New,
    History,
    Help,
    Quit,
}

impl SlashCommand {
    /// Parse a line starting with `/`; the error is shown to the user
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        match name {
            "/mode" => arg
                .parse::<Mode>()
                .map(SlashCommand::Mode)
                .map_err(|_| "Usage: /mode retail|homeport".to_string()),
            "/attach" if arg.is_empty() => Err("Usage: /attach <path>".to_string()),
            "/attach" => Ok(SlashCommand::Attach(PathBuf::from(arg))),
            "/detach" => Ok(SlashCommand::Detach),
            "/status" => Ok(SlashCommand::Status),
            "/new" => Ok(SlashCommand::New),
            "/history" => Ok(SlashCommand::History),
            "/help" | "/?" => Ok(SlashCommand::Help),
            "/quit" | "/exit" | "/q" => Ok(SlashCommand::Quit),
            other => Err(format!("Unknown command {} (try /help)", other)),
        }
    }
}

pub async fn execute(config: LilaConfig, mode: Option<String>) -> Result<ExitCode> {
    let mode = match mode {
        Some(mode) => Some(
            mode.parse::<Mode>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("Invalid --mode")?,
        ),
        None => None,
    };
    let mut session = build_session(&config, mode)?;

    print_banner(session.mode());
    session.open();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&session);
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        if line.trim_start().starts_with('/') {
            match SlashCommand::parse(&line) {
                Ok(SlashCommand::Quit) => break,
                Ok(command) => run_command(&mut session, command).await?,
                Err(usage) => session.renderer_mut().render_notice(&usage),
            }
            continue;
        }

        submit_line(&mut session, &line).await;
    }

    println!("{}", "Goodbye!".bright_blue());
    Ok(ExitCode::SUCCESS)
}

const UPLOAD_RETRY_HINT: &str = "The file is still attached; send again to retry or /detach it.";

async fn submit_line<B, R>(session: &mut ChatSession<B, R>, line: &str)
where
    B: ChatBackend,
    R: Renderer,
{
    if let TurnOutcome::Failed(err) = session.submit(line).await {
        if err.is_upload_failure() {
            session.renderer_mut().render_notice(UPLOAD_RETRY_HINT);
        }
    }
}

async fn run_command<B, R>(session: &mut ChatSession<B, R>, command: SlashCommand) -> Result<()>
where
    B: ChatBackend,
    R: Renderer,
{
    match command {
        SlashCommand::Mode(mode) => {
            if let Err(err) = session.set_mode(mode) {
                session.renderer_mut().render_notice(&err.to_string());
            } else if mode.requires_attachment() && session.attachment().is_none() {
                session
                    .renderer_mut()
                    .render_notice("Attach the loan workbook with /attach <path>");
            }
        }
        SlashCommand::Attach(path) => {
            if let Err(err) = attach_file(session, &path).await {
                session.renderer_mut().render_notice(&format!("{:#}", err));
            }
        }
        SlashCommand::Detach => {
            if session.attachment().is_some() {
                session.remove_attachment();
                session.renderer_mut().render_notice("Attachment removed");
            }
        }
        SlashCommand::Status => print_status(session),
        SlashCommand::New => {
            session.new_conversation();
            session
                .renderer_mut()
                .render_notice("Started a new conversation");
        }
        SlashCommand::History => print_history(session),
        SlashCommand::Help => print_help(),
        SlashCommand::Quit => debug!("quit handled by the input loop"),
    }
    Ok(())
}

fn print_banner(mode: Mode) {
    println!("\n{}", "Lil A".bright_blue().bold());
    println!("{}", "=====".bright_blue());
    println!("Mode: {}", mode.display_name().bright_cyan().bold());
    println!("{}", "Type /help for commands".dimmed());
    println!();
}

fn print_prompt<B, R>(session: &ChatSession<B, R>)
where
    B: ChatBackend,
    R: Renderer,
{
    let attachment = session
        .attachment()
        .map(|a| format!("[{}] ", a.name()).cyan().to_string())
        .unwrap_or_default();
    print!(
        "{}{} {} ",
        attachment,
        session.mode().placeholder().dimmed(),
        "›".bold()
    );
    let _ = std::io::stdout().flush();
}

fn print_status<B, R>(session: &ChatSession<B, R>)
where
    B: ChatBackend,
    R: Renderer,
{
    println!("{} {}", "Mode:".bold(), session.mode().display_name());
    match session.attachment() {
        Some(attachment) => println!(
            "{} {} ({} bytes, {})",
            "Attachment:".bold(),
            attachment.name(),
            attachment.size(),
            status_label(session.attachment_status())
        ),
        None => println!("{} none", "Attachment:".bold()),
    }
    println!(
        "{} {}",
        "Conversation:".bold(),
        session.context().conversation_id().unwrap_or("(new)")
    );
    println!("{} {}", "Session:".bold(), session.context().user_id());
}

fn status_label(status: AttachmentStatus) -> &'static str {
    match status {
        AttachmentStatus::Unattached => "unattached",
        AttachmentStatus::Selected => "selected",
        AttachmentStatus::Uploading => "uploading",
        AttachmentStatus::Uploaded => "uploaded",
        AttachmentStatus::Failed => "upload failed, will retry on next send",
    }
}

fn print_history<B, R>(session: &ChatSession<B, R>)
where
    B: ChatBackend,
    R: Renderer,
{
    if session.transcript().is_empty() {
        println!("{}", "No messages yet".dimmed());
        return;
    }
    for turn in session.transcript() {
        let label = match turn.role {
            Role::User => "you".bright_green().bold(),
            Role::Assistant => "assistant".bright_blue().bold(),
        };
        println!("{} {}", label, turn.text);
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  {} - Switch workflow", "/mode retail|homeport".green());
    println!("  {} - Stage an Excel file for the next message", "/attach <path>".green());
    println!("  {} - Remove the staged file", "/detach".green());
    println!("  {} - Show mode, attachment and conversation", "/status".green());
    println!("  {} - Start a new conversation", "/new".green());
    println!("  {} - Show this session's messages", "/history".green());
    println!("  {} - Exit", "/quit".green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use lila_core::test_support::{network_error, MockBackend, RecordingRenderer};
    use lila_core::{
        AttachmentManager, AttachmentPolicy, ConversationContext, SessionOptions, TransportError,
        TurnError,
    };

    fn session(backend: &MockBackend) -> ChatSession<MockBackend, RecordingRenderer> {
        ChatSession::new(
            backend.clone(),
            RecordingRenderer::new(),
            ConversationContext::new("sess"),
            AttachmentManager::new(AttachmentPolicy::default()),
            SessionOptions::default(),
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(SlashCommand::parse("/mode homeport"), Ok(SlashCommand::Mode(Mode::Homeport)));
        assert_eq!(SlashCommand::parse("/mode  Retail "), Ok(SlashCommand::Mode(Mode::Retail)));
        assert_eq!(
            SlashCommand::parse("/attach ~/loans/file one.xlsx"),
            Ok(SlashCommand::Attach(PathBuf::from("~/loans/file one.xlsx")))
        );
        assert_eq!(SlashCommand::parse("/new"), Ok(SlashCommand::New));
        assert_eq!(SlashCommand::parse("/exit"), Ok(SlashCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(SlashCommand::parse("/mode").is_err());
        assert!(SlashCommand::parse("/mode wholesale").is_err());
        assert!(SlashCommand::parse("/attach").is_err());
        assert_eq!(
            SlashCommand::parse("/frobnicate"),
            Err("Unknown command /frobnicate (try /help)".to_string())
        );
    }

    #[tokio::test]
    async fn test_homeport_without_file_prompts_for_one() {
        let backend = MockBackend::new();
        let mut session = session(&backend);

        run_command(&mut session, SlashCommand::Mode(Mode::Homeport))
            .await
            .unwrap();

        assert_eq!(session.mode(), Mode::Homeport);
        assert_eq!(
            session.renderer().notices(),
            vec!["Attach the loan workbook with /attach <path>"]
        );
    }

    #[tokio::test]
    async fn test_attach_missing_file_is_a_notice() {
        let backend = MockBackend::new();
        let mut session = session(&backend);

        run_command(
            &mut session,
            SlashCommand::Attach(PathBuf::from("/definitely/not/here.xlsx")),
        )
        .await
        .unwrap();

        assert!(session.attachment().is_none());
        assert_eq!(session.renderer().notices().len(), 1);
        assert!(session.renderer().notices()[0].starts_with("Failed to read"));
    }

    #[tokio::test]
    async fn test_attach_and_detach_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rates.xlsx");
        std::fs::write(&path, b"PK\x03\x04").unwrap();
        let backend = MockBackend::new();
        let mut session = session(&backend);

        run_command(&mut session, SlashCommand::Attach(path)).await.unwrap();
        assert_eq!(session.attachment().map(|a| a.name()), Some("rates.xlsx"));

        run_command(&mut session, SlashCommand::Detach).await.unwrap();
        assert!(session.attachment().is_none());
    }

    #[tokio::test]
    async fn test_failed_upload_suggests_retry() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rates.xlsx");
        std::fs::write(&path, b"PK\x03\x04").unwrap();
        let backend = MockBackend::new();
        backend.set_upload(Err(TurnError::Transport(TransportError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
        })));
        let mut session = session(&backend);
        run_command(&mut session, SlashCommand::Attach(path)).await.unwrap();

        submit_line(&mut session, "summarize").await;

        assert_eq!(session.renderer().notices(), vec![UPLOAD_RETRY_HINT]);
        assert_eq!(session.attachment().map(|a| a.name()), Some("rates.xlsx"));
    }

    #[tokio::test]
    async fn test_failed_chat_has_no_retry_hint() {
        let backend = MockBackend::new();
        backend.push_chat(Err(network_error("connection refused")));
        let mut session = session(&backend);

        submit_line(&mut session, "hi").await;

        assert!(session.renderer().notices().is_empty());
        assert_eq!(session.renderer().errors().len(), 1);
    }

    #[tokio::test]
    async fn test_new_conversation_command() {
        let backend = MockBackend::new();
        backend.push_chat_chunks(vec!["data: {\"event\":\"message_end\",\"conversation_id\":\"c1\"}\n"]);
        let mut session = session(&backend);
        session.submit("hi").await;
        assert_eq!(session.context().conversation_id(), Some("c1"));

        run_command(&mut session, SlashCommand::New).await.unwrap();

        assert_eq!(session.context().conversation_id(), None);
        assert_eq!(session.context().user_id(), "sess");
    }
}
