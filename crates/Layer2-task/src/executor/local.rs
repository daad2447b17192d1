//! Local executor - runs tasks on the host system
//!
//! One subprocess per task: `<shell> -c <command>` in the task's working
//! directory. Stdout and stderr are collected in full and returned once the
//! process exits; stdin is closed so commands never read the server's input.

use crate::executor::{Executor, ProcessOutput};
use crate::task::CommandTask;
use async_trait::async_trait;
use repl_foundation::{Error, Result};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Local executor that runs tasks directly on the host
#[derive(Debug, Default)]
pub struct LocalExecutor;

impl LocalExecutor {
    pub fn new() -> Self {
        Self
    }

    fn build_command(task: &CommandTask) -> Command {
        let mut cmd = Command::new(task.shell.executable());
        cmd.args(task.shell.exec_args())
            .arg(&task.command)
            .current_dir(&task.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Exit code, or the negated signal number when killed by a signal
pub(crate) fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    crate::task::FAILED_RETURN_CODE
}

#[async_trait]
impl Executor for LocalExecutor {
    async fn execute(&self, task: &CommandTask) -> Result<ProcessOutput> {
        debug!("Creating subprocess for task {}", task.id);

        let child = Self::build_command(task).spawn().map_err(|e| {
            Error::Process(format!(
                "Failed to spawn '{}' in {}: {}",
                task.shell.executable(),
                task.working_dir.display(),
                e
            ))
        })?;

        info!("Process created with PID: {:?}", child.id());

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Process(format!("Failed to wait for process: {}", e)))?;

        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: exit_code(&output.status),
        };

        info!("Task {} completed with return code: {}", task.id, result.exit_code);
        if !result.stderr.is_empty() {
            warn!("Task {} stderr output: {}", task.id, result.stderr.trim_end());
        }

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repl_foundation::ShellType;

    #[tokio::test]
    async fn test_local_echo() {
        let task = CommandTask::new("echo hello", ShellType::Sh, std::env::temp_dir());
        let output = LocalExecutor::new().execute(&task).await.unwrap();

        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "");
        assert_eq!(output.exit_code, 0);
    }

    #[tokio::test]
    async fn test_local_separates_streams_and_exit_code() {
        let task = CommandTask::new(
            "echo out; echo err 1>&2; exit 3",
            ShellType::Sh,
            std::env::temp_dir(),
        );
        let output = LocalExecutor::new().execute(&task).await.unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.exit_code, 3);
    }

    #[tokio::test]
    async fn test_local_runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let task = CommandTask::new("pwd", ShellType::Sh, dir.path());
        let output = LocalExecutor::new().execute(&task).await.unwrap();

        let expected = dir.path().canonicalize().unwrap();
        let actual = std::path::PathBuf::from(output.stdout.trim())
            .canonicalize()
            .unwrap();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_local_spawn_failure_is_process_error() {
        let task = CommandTask::new("echo hi", ShellType::Sh, "/definitely/not/a/dir");
        let err = LocalExecutor::new().execute(&task).await.unwrap_err();
        assert!(matches!(err, Error::Process(_)));
    }
}
