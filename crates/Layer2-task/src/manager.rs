//! Task Manager - the task registry
//!
//! Owns every command task issued by this process. Tasks are never removed,
//! so an id resolves to the same task until restart.

use crate::executor::{Executor, LocalExecutor};
use crate::task::{CommandTask, TaskId, TaskSnapshot};
use repl_foundation::{Error, Result, ShellType};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info};

/// Deadline for returning a command result inline
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time a status poll waits for a running task
pub const POLL_WINDOW: Duration = Duration::from_secs(5);

/// Re-check interval while a status poll waits
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for task manager
#[derive(Debug, Clone)]
pub struct TaskManagerConfig {
    /// Sync/async gate deadline
    pub sync_timeout: Duration,

    /// Status poll wait window
    pub poll_window: Duration,

    /// Status poll re-check interval
    pub poll_interval: Duration,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            sync_timeout: SYNC_TIMEOUT,
            poll_window: POLL_WINDOW,
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// Task Manager - handles task lifecycle and execution
#[derive(Clone)]
pub struct TaskManager {
    /// All tasks by ID
    tasks: Arc<RwLock<HashMap<TaskId, CommandTask>>>,

    /// Process backend
    executor: Arc<dyn Executor>,

    /// Configuration
    pub(crate) config: Arc<TaskManagerConfig>,
}

impl TaskManager {
    /// Create a new task manager backed by the local executor
    pub fn new(config: TaskManagerConfig) -> Self {
        Self::with_executor(config, Arc::new(LocalExecutor::new()))
    }

    /// Create with a custom executor
    pub fn with_executor(config: TaskManagerConfig, executor: Arc<dyn Executor>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            executor,
            config: Arc::new(config),
        }
    }

    /// Validate inputs and register a new pending task.
    ///
    /// Nothing is spawned here; a bad working directory is rejected before
    /// the task exists.
    pub async fn submit(
        &self,
        command: impl Into<String>,
        shell: ShellType,
        working_dir: impl Into<PathBuf>,
    ) -> Result<TaskId> {
        let command = command.into();
        let working_dir = working_dir.into();

        if command.trim().is_empty() {
            return Err(Error::missing_argument("command"));
        }
        if !working_dir.exists() {
            return Err(Error::Validation(format!(
                "Working directory does not exist: {}",
                working_dir.display()
            )));
        }
        if !working_dir.is_dir() {
            return Err(Error::Validation(format!(
                "Working directory is not a directory: {}",
                working_dir.display()
            )));
        }

        let task = CommandTask::new(command, shell, working_dir);
        let task_id = task.id;
        info!("Created task {} for command: {}", task_id, task.command);

        self.tasks.write().await.insert(task_id, task);
        Ok(task_id)
    }

    /// Run a pending task's process to exit and record the outcome.
    ///
    /// Spawn and wait faults are recorded on the task (state `failed`);
    /// `Err` is returned only for an unknown id or a task already started.
    pub async fn run_to_completion(&self, task_id: TaskId) -> Result<TaskSnapshot> {
        let task = {
            let mut tasks = self.tasks.write().await;
            let task = tasks
                .get_mut(&task_id)
                .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
            task.start()?;
            task.clone()
        };

        info!("Executing task {} via {}: {}", task_id, self.executor.name(), task.command);
        let started = Instant::now();
        let result = self.executor.execute(&task).await;
        let elapsed = started.elapsed();

        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        match result {
            Ok(output) => task.complete(output, elapsed)?,
            Err(e) => {
                let message = format!("Error executing command: {}", fault_text(&e));
                error!("Task {}: {}", task_id, message);
                task.fail(message, elapsed)?;
            }
        }

        Ok(task.snapshot())
    }

    /// Get a task by ID
    pub async fn get(&self, task_id: TaskId) -> Option<CommandTask> {
        self.tasks.read().await.get(&task_id).cloned()
    }

    /// Current snapshot of a task
    pub async fn snapshot(&self, task_id: TaskId) -> Result<TaskSnapshot> {
        self.tasks
            .read()
            .await
            .get(&task_id)
            .map(CommandTask::snapshot)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    /// Get count of running tasks
    pub async fn running_count(&self) -> usize {
        self.tasks
            .read()
            .await
            .values()
            .filter(|t| t.state.is_running())
            .count()
    }

    /// Number of tasks ever issued
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new(TaskManagerConfig::default())
    }
}

/// Error text without the wrapping category prefix
fn fault_text(error: &Error) -> String {
    match error {
        Error::Process(msg) => msg.clone(),
        other => other.to_string(),
    }
}
