//! Interpreter worker process

use crate::driver::{WorkerReply, WorkerRequest, DRIVER_SCRIPT};
use repl_foundation::{Error, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info};

/// How long to wait for a worker that closed its pipes to exit
const EXIT_GRACE: Duration = Duration::from_millis(500);

/// A running driver process. Killed when dropped.
pub(crate) struct Worker {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl Worker {
    pub(crate) fn spawn(interpreter: &str) -> Result<Self> {
        let mut child = Command::new(interpreter)
            .arg("-u")
            .arg("-c")
            .arg(DRIVER_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Process(format!("Failed to start {}: {}", interpreter, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Process("Interpreter stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Process("Interpreter stdout unavailable".into()))?;

        info!("Started interpreter worker {} (PID: {:?})", interpreter, child.id());
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    /// Send one submission and wait for its reply
    pub(crate) async fn run(&mut self, code: &str) -> Result<WorkerReply> {
        let mut line = serde_json::to_string(&WorkerRequest { code })?;
        line.push('\n');

        let sent = match self.stdin.write_all(line.as_bytes()).await {
            Ok(()) => self.stdin.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            debug!("Interpreter pipe error: {}", e);
            return Err(self.exited().await);
        }

        let reply = match self.stdout.next_line().await {
            Ok(Some(reply)) => reply,
            Ok(None) => return Err(self.exited().await),
            Err(e) => {
                debug!("Interpreter pipe error: {}", e);
                return Err(self.exited().await);
            }
        };

        serde_json::from_str(&reply)
            .map_err(|e| Error::Protocol(format!("Unreadable interpreter reply: {}", e)))
    }

    async fn exited(&mut self) -> Error {
        match timeout(EXIT_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => Error::Process(format!("Interpreter exited ({})", status)),
            _ => Error::Process("Interpreter stopped responding".into()),
        }
    }
}
