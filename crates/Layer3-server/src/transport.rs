//! Line-delimited stdio transport
//!
//! Every request runs in its own task; a single writer task owns the output
//! stream so replies never interleave.

use crate::server::ReplServer;
use repl_foundation::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// How long requests still running at EOF may take to reply before they are
/// cancelled. Longer than the shell sync deadline so a command call always
/// gets its inline result or task id.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(6);

/// Serve until `reader` reaches EOF, then give in-flight requests
/// [`SHUTDOWN_GRACE`] to reply and cancel the rest
pub async fn serve<R, W>(server: Arc<ReplServer>, reader: R, writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(64);
    let writer_task = tokio::spawn(write_loop(writer, rx));
    let mut handlers = JoinSet::new();

    let mut lines = reader.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                handlers.spawn(handle(Arc::clone(&server), line, tx.clone()));
            }
            Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                report(joined);
            }
        }
    }

    info!("Input closed, waiting for {} in-flight request(s)", handlers.len());
    let drained = timeout(SHUTDOWN_GRACE, async {
        while let Some(joined) = handlers.join_next().await {
            report(joined);
        }
    })
    .await;
    if drained.is_err() {
        warn!("Cancelling {} request(s) still running", handlers.len());
        handlers.shutdown().await;
    }

    drop(tx);
    match writer_task.await {
        Ok(result) => result,
        Err(e) => Err(Error::Internal(format!("Writer task failed: {}", e))),
    }
}

async fn handle(server: Arc<ReplServer>, line: String, tx: mpsc::Sender<String>) {
    let Some(response) = server.handle_line(&line).await else {
        return;
    };
    match serde_json::to_string(&response) {
        Ok(msg) => {
            if tx.send(msg).await.is_err() {
                debug!("Output closed, dropping reply");
            }
        }
        Err(e) => error!("Failed to serialize reply: {}", e),
    }
}

fn report(joined: std::result::Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Request handler failed: {}", e);
    }
}

/// Serve on the process's stdin and stdout
pub async fn serve_stdio(server: Arc<ReplServer>) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(server, stdin, tokio::io::stdout()).await
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::Receiver<String>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut msg) = rx.recv().await {
        debug!("-> {}", msg);
        msg.push('\n');
        writer.write_all(msg.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
