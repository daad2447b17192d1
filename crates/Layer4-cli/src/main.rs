//! repl - Main entry point

mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use repl_foundation::ReplConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// repl - python sessions and shell commands for agents, over MCP stdio
#[derive(Parser, Debug)]
#[command(name = "repl")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Load this config file instead of the global and project files
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds of inactivity before a python session is discarded
    #[arg(long)]
    idle_timeout: Option<u64>,

    /// Interpreter started for python sessions
    #[arg(long)]
    interpreter: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP on stdin/stdout (the default)
    Serve,
    /// Print the tool definitions as JSON
    Tools,
    /// Print the effective configuration as JSON
    Config,
    /// Write the effective configuration to ./.repl/config.json
    Init {
        /// Overwrite an existing project config
        #[arg(short, long)]
        force: bool,
    },
}

impl Args {
    /// Resolve configuration: file(s) first, then command-line overrides
    fn load_config(&self) -> anyhow::Result<ReplConfig> {
        let mut config = match &self.config {
            Some(path) => ReplConfig::load_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ReplConfig::load().context("Failed to load config")?,
        };

        if let Some(secs) = self.idle_timeout {
            config.session.idle_timeout_secs = Some(secs);
        }
        if let Some(interpreter) = &self.interpreter {
            config.session.interpreter = Some(interpreter.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries the protocol
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = args.load_config()?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve(&config).await,
        Command::Tools => cli::print_tools(),
        Command::Config => cli::print_config(&config),
        Command::Init { force } => cli::init_project(&config, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_command_is_serve() {
        let args = Args::try_parse_from(["repl"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"session": {"idleTimeoutSecs": 120, "interpreter": "python3.11"}}"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "repl",
            "--config",
            path.to_str().unwrap(),
            "--idle-timeout",
            "30",
        ])
        .unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.session.idle_timeout(), Duration::from_secs(30));
        assert_eq!(config.session.interpreter(), "python3.11");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = Args::try_parse_from(["repl", "-c", "/no/such/config.json", "tools"]).unwrap();
        assert!(matches!(args.command, Some(Command::Tools)));
        assert!(args.load_config().is_err());
    }
}
