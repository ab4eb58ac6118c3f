mod auth;
mod board;
mod cli;
mod config;
mod error;
mod identity;
mod input;
mod models;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::info;
use std::fs;
use std::path::PathBuf;

use auth::AuthSession;
use cli::{Cli, Commands};
use config::{Config, DEFAULT_LOG_LEVEL};
use ui::run_tui;

/// The TUI owns the terminal, so logs go to a file
fn setup_logging(level: Option<&str>) -> Result<PathBuf> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todoboard");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_path = log_dir.join("todoboard.log");
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_LEVEL));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .write_style(env_logger::WriteStyle::Never)
        .init();

    Ok(log_path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        use clap_complete::{generate, Shell};
        let shell_enum = match shell.to_lowercase().as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "elvish" => Shell::Elvish,
            "powershell" => Shell::PowerShell,
            other => {
                println!("Unsupported shell: {}", other);
                return Ok(());
            }
        };
        let mut cmd = Cli::command();
        generate(shell_enum, &mut cmd, "todoboard", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load(&cli).context("Failed to load configuration")?;
    let log_path = setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;
    info!(
        "todoboard starting: backend={} log={}",
        config.backend,
        log_path.display()
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let identity = identity::build_identity(&config).context("Failed to set up identity service")?;
    let session = AuthSession::new(identity, runtime.handle().clone());

    // Tui and no subcommand both launch the board
    run_tui(session)?;

    info!("todoboard exiting");
    Ok(())
}
