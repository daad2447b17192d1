//! Command task definition and types

use crate::executor::ProcessOutput;
use crate::state::TaskState;
use chrono::{DateTime, Utc};
use repl_foundation::{Error, Result, ShellType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Return code recorded when the process could not be run at all
pub const FAILED_RETURN_CODE: i32 = -1;

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a new random TaskId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    /// Anything that is not a well-formed id can never have been issued
    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(TaskId)
            .map_err(|_| Error::TaskNotFound(s.to_string()))
    }
}

/// One external-process invocation
#[derive(Debug, Clone)]
pub struct CommandTask {
    /// Unique task identifier
    pub id: TaskId,

    /// Command text passed to the shell
    pub command: String,

    /// Shell the command runs under
    pub shell: ShellType,

    /// Working directory of the process
    pub working_dir: PathBuf,

    /// Current state
    pub state: TaskState,

    /// Captured standard output (set once, on completion)
    pub stdout: String,

    /// Captured standard error (set once, on completion)
    pub stderr: String,

    /// Exit status, present only once terminal
    pub return_code: Option<i32>,

    /// When the process was started
    pub started_at: Option<DateTime<Utc>>,

    /// Wall-clock time from start to terminal state
    pub execution_time: Option<Duration>,
}

impl CommandTask {
    /// Create a new pending task
    pub fn new(command: impl Into<String>, shell: ShellType, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: TaskId::new(),
            command: command.into(),
            shell,
            working_dir: working_dir.into(),
            state: TaskState::Pending,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            started_at: None,
            execution_time: None,
        }
    }

    fn transition(&mut self, next: TaskState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            warn!("Task {}: rejected transition {} -> {}", self.id, self.state, next);
            return Err(Error::invalid_transition(self.state, next));
        }
        self.state = next;
        Ok(())
    }

    /// Mark task as running
    pub fn start(&mut self) -> Result<()> {
        self.transition(TaskState::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Record process output and mark task as completed
    pub fn complete(&mut self, output: ProcessOutput, elapsed: Duration) -> Result<()> {
        self.transition(TaskState::Completed)?;
        self.stdout = output.stdout;
        self.stderr = output.stderr;
        self.return_code = Some(output.exit_code);
        self.execution_time = Some(elapsed);
        Ok(())
    }

    /// Record a spawn/wait fault and mark task as failed
    pub fn fail(&mut self, message: impl Into<String>, elapsed: Duration) -> Result<()> {
        self.transition(TaskState::Failed)?;
        self.stderr = message.into();
        self.return_code = Some(FAILED_RETURN_CODE);
        self.execution_time = Some(elapsed);
        Ok(())
    }

    /// Point-in-time copy for callers
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            command: self.command.clone(),
            state: self.state,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            return_code: self.return_code,
            started_at: self.started_at,
            execution_time: self.execution_time,
        }
    }
}

/// Observed view of a task at one moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub command: String,
    pub state: TaskState,
    pub stdout: String,
    pub stderr: String,
    pub return_code: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub execution_time: Option<Duration>,
}
