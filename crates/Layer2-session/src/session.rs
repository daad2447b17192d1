//! Interpreter session

use crate::worker::Worker;
use repl_foundation::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique identifier for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(SessionId)
            .map_err(|_| Error::SessionNotFound(s.to_string()))
    }
}

/// Captured result of one `execute` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    /// `repr` of the value when the submission was a single expression
    pub result: Option<String>,
    pub execution_time: Duration,
}

/// One persistent namespace, backed by a worker process.
///
/// The worker is started on first use. If it dies, the failure is reported
/// in that call's stderr and the next call starts a fresh one.
pub struct InterpreterSession {
    id: SessionId,
    interpreter: String,
    worker: Option<Worker>,
    /// Workers started so far
    generation: u32,
}

impl InterpreterSession {
    pub fn new(id: SessionId, interpreter: impl Into<String>) -> Self {
        Self {
            id,
            interpreter: interpreter.into(),
            worker: None,
            generation: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Whether a worker process is currently attached
    pub fn is_live(&self) -> bool {
        self.worker.is_some()
    }

    /// Run `code` against this session's namespace.
    ///
    /// Never fails: faults raised by the code, and faults talking to the
    /// worker, are reported in `stderr`.
    pub async fn execute(&mut self, code: &str) -> ExecutionOutput {
        let started = Instant::now();
        let mut notes = String::new();

        let mut worker = match self.worker.take() {
            Some(worker) => worker,
            None => match self.start_worker(&mut notes) {
                Ok(worker) => worker,
                Err(e) => {
                    warn!("Session {}: {}", self.id, e);
                    notes.push_str(&format!("{}\n", e));
                    return ExecutionOutput {
                        stderr: notes,
                        execution_time: started.elapsed(),
                        ..Default::default()
                    };
                }
            },
        };

        let output = match worker.run(code).await {
            Ok(reply) => {
                self.worker = Some(worker);
                ExecutionOutput {
                    stdout: reply.stdout,
                    stderr: notes + &reply.stderr,
                    result: reply.result,
                    execution_time: started.elapsed(),
                }
            }
            Err(e) => {
                // Dropping the worker kills whatever is left of it
                warn!("Session {}: {}", self.id, e);
                notes.push_str(&format!("{}\n", e));
                ExecutionOutput {
                    stderr: notes,
                    execution_time: started.elapsed(),
                    ..Default::default()
                }
            }
        };

        debug!(
            "Session {} executed in {:?}",
            self.id, output.execution_time
        );
        output
    }

    fn start_worker(&mut self, notes: &mut String) -> Result<Worker> {
        let worker = Worker::spawn(&self.interpreter)?;
        if self.generation > 0 {
            notes.push_str("Interpreter restarted; previous session state was lost\n");
        }
        self.generation += 1;
        Ok(worker)
    }
}

impl fmt::Debug for InterpreterSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterSession")
            .field("id", &self.id)
            .field("interpreter", &self.interpreter)
            .field("live", &self.is_live())
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> Option<String> {
        which::which("python3")
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
    }

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::new();
        assert_eq!(id.to_string().parse::<SessionId>().unwrap(), id);

        let err = "nope".parse::<SessionId>().unwrap_err();
        assert!(err.is_lookup());
        assert_eq!(err.to_string(), "No session found with id: nope");
    }

    #[tokio::test]
    async fn test_missing_interpreter_reports_in_stderr() {
        let mut session = InterpreterSession::new(SessionId::new(), "/nonexistent/python-xyz");
        let output = session.execute("1 + 1").await;
        assert!(output.stdout.is_empty());
        assert!(output.stderr.contains("Failed to start /nonexistent/python-xyz"));
        assert!(!session.is_live());
    }

    #[tokio::test]
    async fn test_expression_and_statements() {
        let Some(python) = python() else { return };
        let mut session = InterpreterSession::new(SessionId::new(), python);

        let output = session.execute("1 + 1").await;
        assert_eq!(output.result.as_deref(), Some("2"));
        assert!(output.stderr.is_empty());

        let output = session.execute("import math\nr = math.sqrt(16)").await;
        assert!(output.result.is_none());
        assert!(output.stderr.is_empty());

        let output = session.execute("print(r)").await;
        assert_eq!(output.stdout, "4.0\n");
        assert!(output.result.is_none());
    }

    #[tokio::test]
    async fn test_runtime_fault_is_captured() {
        let Some(python) = python() else { return };
        let mut session = InterpreterSession::new(SessionId::new(), python);

        let output = session.execute("print('before')\n1 / 0").await;
        assert_eq!(output.stdout, "before\n");
        assert!(output.stderr.contains("ZeroDivisionError"));

        // Buffers do not carry over
        let output = session.execute("print('after')").await;
        assert_eq!(output.stdout, "after\n");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_worker_exit_then_respawn() {
        let Some(python) = python() else { return };
        let mut session = InterpreterSession::new(SessionId::new(), python);

        session.execute("x = 1").await;
        let output = session.execute("raise SystemExit(3)").await;
        assert!(output.stderr.contains("Interpreter"));
        assert!(!session.is_live());

        let output = session.execute("print('x' in dir())").await;
        assert!(output.stderr.contains("previous session state was lost"));
        assert_eq!(output.stdout, "False\n");
    }
}
