//! Executor trait

use crate::task::CommandTask;
use async_trait::async_trait;
use repl_foundation::Result;

/// Captured result of one finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Executor trait - implement to add new execution backends
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run the task's command to exit and capture its output.
    ///
    /// `Err` means the process could not be spawned or waited on; a
    /// non-zero exit status is still `Ok`.
    async fn execute(&self, task: &CommandTask) -> Result<ProcessOutput>;

    /// Get executor name
    fn name(&self) -> &'static str;
}
