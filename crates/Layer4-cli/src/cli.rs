//! Server run loop and the informational subcommands

use repl_foundation::{JsonStore, ReplConfig, REPL_CONFIG_FILE};
use repl_server::{serve_stdio, McpTool, ReplServer};
use repl_session::{SessionConfig, SessionRegistry};
use repl_task::TaskManager;
use repl_tool::{ToolContext, ToolRegistry};
use std::sync::Arc;
use tracing::{error, info};

/// Run the MCP server until stdin closes or Ctrl-C
pub async fn serve(config: &ReplConfig) -> anyhow::Result<()> {
    let sessions = SessionRegistry::new(SessionConfig::from_settings(&config.session));
    let tasks = TaskManager::default();
    let ctx = ToolContext::new(sessions, tasks, config);
    let server = Arc::new(ReplServer::new(ToolRegistry::with_builtins(), ctx));

    server.start();
    info!(
        "repl {} serving on stdio (session idle timeout {:?})",
        env!("CARGO_PKG_VERSION"),
        config.session.idle_timeout()
    );

    let interrupted = tokio::select! {
        result = serve_stdio(Arc::clone(&server)) => {
            if let Err(e) = result {
                error!("Transport error: {}", e);
            }
            false
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
            info!("Interrupted, shutting down");
            true
        }
    };

    server.shutdown().await;
    info!("Shutdown complete");

    if interrupted {
        // The stdin reader thread is still parked in a blocking read
        std::process::exit(0);
    }
    Ok(())
}

pub fn print_tools() -> anyhow::Result<()> {
    let tools: Vec<McpTool> = ToolRegistry::with_builtins()
        .definitions()
        .into_iter()
        .map(McpTool::from)
        .collect();
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}

pub fn print_config(config: &ReplConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Write the effective configuration as this directory's project config
pub fn init_project(config: &ReplConfig, force: bool) -> anyhow::Result<()> {
    let store = JsonStore::current_project()?;
    let path = store.file_path(REPL_CONFIG_FILE);

    if store.exists(REPL_CONFIG_FILE) && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    store.save(REPL_CONFIG_FILE, &config.resolved())?;
    println!("Wrote {}", path.display());
    Ok(())
}
