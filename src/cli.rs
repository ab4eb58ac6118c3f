use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Terminal to-do board with email/password sign-in", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Identity backend: 'rest' or 'memory'
    #[arg(long, global = true, value_name = "BACKEND")]
    pub backend: Option<String>,

    /// API key for the REST identity service
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Base URL of the REST identity service
    #[arg(long, global = true, value_name = "URL")]
    pub auth_url: Option<String>,

    /// HTTP timeout for identity requests, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch TUI interface
    Tui,
    /// Print shell completions
    Completions {
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["todoboard"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["todoboard", "tui", "--backend", "memory", "--log-level", "debug"]);
        assert!(matches!(cli.command, Some(Commands::Tui)));
        assert_eq!(cli.backend.as_deref(), Some("memory"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_completions_takes_shell() {
        let cli = Cli::parse_from(["todoboard", "completions", "zsh"]);
        match cli.command {
            Some(Commands::Completions { shell }) => assert_eq!(shell, "zsh"),
            _ => panic!("expected completions"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
