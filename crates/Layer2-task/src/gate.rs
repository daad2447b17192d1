//! Sync/async gate
//!
//! A command gets `sync_timeout` to finish. If it makes it, the caller gets
//! the full result inline. Otherwise the same running job is detached and
//! the caller gets the task id to poll. The process is spawned exactly once
//! either way.

use crate::manager::TaskManager;
use crate::task::{TaskId, TaskSnapshot};
use repl_foundation::{Error, Result, ShellType};
use std::path::PathBuf;
use tracing::{debug, info};

/// What the gate hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Finished within the deadline
    Completed(TaskSnapshot),

    /// Still running; poll this id for the result
    Detached(TaskId),
}

impl CommandOutcome {
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::Completed(snapshot) => snapshot.id,
            Self::Detached(id) => *id,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Detached(_))
    }
}

impl TaskManager {
    /// Run a shell command, inline if it finishes quickly, detached otherwise.
    ///
    /// Validation failures spawn nothing and register no task.
    pub async fn run_command(
        &self,
        command: impl Into<String>,
        shell: ShellType,
        working_dir: impl Into<PathBuf>,
    ) -> Result<CommandOutcome> {
        let task_id = self.submit(command, shell, working_dir).await?;

        let manager = self.clone();
        let mut job = tokio::spawn(async move { manager.run_to_completion(task_id).await });

        let deadline = self.config.sync_timeout;
        match tokio::time::timeout(deadline, &mut job).await {
            Ok(joined) => {
                let snapshot = joined.map_err(|e| {
                    Error::Internal(format!("Task {} worker stopped: {}", task_id, e))
                })??;
                debug!("Task {} finished inline as {}", task_id, snapshot.state);
                Ok(CommandOutcome::Completed(snapshot))
            }
            Err(_) => {
                info!(
                    "Command taking longer than {:?}, switching to async mode (task {})",
                    deadline, task_id
                );
                // Dropping the handle leaves the job running in the background
                drop(job);
                Ok(CommandOutcome::Detached(task_id))
            }
        }
    }
}
