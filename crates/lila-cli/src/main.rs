use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

use lila_cli::cli::{Cli, Commands};
use lila_cli::{commands, config, logging};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration with CLI overrides
    let config = config::load(cli.config, cli.base_url)?;

    // Initialize logging (stderr, so the conversation on stdout stays clean)
    logging::init(cli.log_level, cli.verbose, &config.logging.level);
    debug!(base_url = %config.backend.base_url, "configuration loaded");

    match cli.command {
        Some(Commands::Ask { query, attach }) => commands::ask::execute(config, query, attach).await,
        Some(Commands::Analyze { path }) => commands::analyze::execute(config, path).await,
        Some(Commands::Health) => commands::health::execute(config).await,
        Some(Commands::Chat { mode }) => commands::chat::execute(config, mode).await,
        // Default to chat when no subcommand is provided
        None => commands::chat::execute(config, None).await,
    }
}
