//! Tracing setup for the binary
//!
//! Logs go to stderr so they never interleave with the conversation on stdout.

use crate::cli::LogLevel;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Pick the filter directive: `--log-level`, then `-v`, then `RUST_LOG`,
/// then the config file, then `off`
pub fn resolve_directive(
    cli_level: Option<LogLevel>,
    verbose: bool,
    rust_log: Option<String>,
    config_level: &str,
) -> String {
    if let Some(level) = cli_level {
        return LevelFilter::from(level).to_string().to_lowercase();
    }
    if verbose {
        return "debug".to_string();
    }
    if let Some(env) = rust_log.filter(|v| !v.trim().is_empty()) {
        return env;
    }
    if !config_level.trim().is_empty() {
        return config_level.trim().to_string();
    }
    "off".to_string()
}

pub fn init(cli_level: Option<LogLevel>, verbose: bool, config_level: &str) {
    let directive = resolve_directive(
        cli_level,
        verbose,
        std::env::var("RUST_LOG").ok(),
        config_level,
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("off"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
