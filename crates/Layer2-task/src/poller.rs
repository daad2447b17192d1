//! Status poller
//!
//! Reads task state without touching it. A poll on a running task waits up
//! to `poll_window`, re-checking every `poll_interval`, and returns early
//! once the task reaches a terminal state.

use crate::manager::TaskManager;
use crate::task::{TaskId, TaskSnapshot};
use repl_foundation::Result;
use tokio::time::{sleep, Instant};
use tracing::debug;

impl TaskManager {
    /// Snapshot a task, waiting briefly if it is still running.
    pub async fn poll(&self, task_id: TaskId) -> Result<TaskSnapshot> {
        let mut snapshot = self.snapshot(task_id).await?;
        if !snapshot.state.is_running() {
            return Ok(snapshot);
        }

        let window = self.config.poll_window;
        let interval = self.config.poll_interval;
        let started = Instant::now();
        debug!("Task {} still running, waiting up to {:?}", task_id, window);

        while snapshot.state.is_running() && started.elapsed() < window {
            sleep(interval).await;
            snapshot = self.snapshot(task_id).await?;
        }

        Ok(snapshot)
    }

    /// Poll by textual id. Malformed ids are reported as not found.
    pub async fn poll_str(&self, task_id: &str) -> Result<TaskSnapshot> {
        self.poll(task_id.parse()?).await
    }
}
