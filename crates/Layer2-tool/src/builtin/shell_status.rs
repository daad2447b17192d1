//! Shell status tool - poll a background command

use crate::output::CodeOutput;
use crate::r#trait::{non_empty, parse_params};
use crate::{Tool, ToolContext, ToolDef, ToolResult};
use async_trait::async_trait;
use repl_foundation::{Error, Result};
use repl_task::TaskSnapshot;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub struct ShellStatusTool;

#[derive(Debug, Deserialize)]
struct ShellStatusParams {
    #[serde(default, alias = "taskId")]
    task_id: Option<String>,
}

impl ShellStatusTool {
    pub fn new() -> Self {
        Self
    }

    fn render(snapshot: TaskSnapshot) -> String {
        let details = CodeOutput {
            execution_time: snapshot.execution_time,
            stdout: snapshot.stdout,
            stderr: snapshot.stderr,
            result: snapshot.return_code.map(|rc| rc.to_string()),
        };

        let mut text = format!("Status: {}", snapshot.state);
        if snapshot.state.is_running() {
            if let Some(started_at) = snapshot.started_at {
                text.push_str(&format!("\nStarted at: {}", started_at.to_rfc3339()));
            }
        }
        if details != CodeOutput::default() {
            text.push('\n');
            text.push_str(&details.format());
        }
        text
    }

    async fn run(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let params: ShellStatusParams = parse_params(params)?;
        let task_id = non_empty(params.task_id).ok_or_else(|| Error::missing_argument("task_id"))?;

        match ctx.tasks.poll_str(&task_id).await {
            Ok(snapshot) => {
                debug!("Status of task {}: {}", task_id, snapshot.state);
                Ok(Self::render(snapshot))
            }
            // Unknown tasks are answered in text, not as a failed call
            Err(e) if e.is_lookup() => Ok(format!("Error: {}", e)),
            Err(e) => Err(e),
        }
    }
}

impl Default for ShellStatusTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ShellStatusTool {
    fn definition(&self) -> ToolDef {
        ToolDef::builder(
            "shell_status",
            "Check the status of a shell command that switched to async mode.\n\
             Provide the task ID that was returned by the shell command.\n\
             Will wait up to 5 seconds for task completion.",
        )
        .string_param("task_id", "Task ID from shell command", true)
        .build()
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> ToolResult {
        match self.run(ctx, params).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => e.into(),
        }
    }
}
