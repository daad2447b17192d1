//! Shell tool - run a command, inline or as a background task

use crate::output::CodeOutput;
use crate::r#trait::{non_empty, parse_params};
use crate::{Tool, ToolContext, ToolDef, ToolResult};
use async_trait::async_trait;
use repl_foundation::{Error, Result, ShellType};
use repl_task::CommandOutcome;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

pub struct ShellTool;

#[derive(Debug, Deserialize)]
struct ShellParams {
    #[serde(default)]
    command: String,
    #[serde(default)]
    shell: Option<String>,
    #[serde(default, alias = "workingDirectory", alias = "workingDir")]
    working_dir: Option<String>,
}

impl ShellTool {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let params: ShellParams = parse_params(params)?;
        if params.command.trim().is_empty() {
            return Err(Error::missing_argument("command"));
        }

        let shell = match non_empty(params.shell) {
            Some(name) => name.parse::<ShellType>()?,
            None => ctx.shell.default_shell(),
        };
        let working_dir = non_empty(params.working_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.shell.default_working_dir());

        let outcome = ctx
            .tasks
            .run_command(params.command, shell, working_dir)
            .await?;

        Ok(match outcome {
            CommandOutcome::Completed(snapshot) => CodeOutput {
                execution_time: snapshot.execution_time,
                stdout: snapshot.stdout,
                stderr: snapshot.stderr,
                result: snapshot.return_code.map(|rc| rc.to_string()),
            }
            .format(),
            CommandOutcome::Detached(task_id) => format!(
                "Task started with ID: {}\nUse shell_status with this task ID to check progress.",
                task_id
            ),
        })
    }
}

impl Default for ShellTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn definition(&self) -> ToolDef {
        ToolDef::builder(
            "shell",
            "Execute shell commands with automatic async fallback.\n\
             If the command completes within 5 seconds, you'll get the result immediately.\n\
             If it takes longer, you'll get a task ID that you can use to check status with shell_status.",
        )
        .enum_param("shell", "Shell to use (bash/sh/zsh)", ShellType::names(), false)
        .default_value("shell", "bash")
        .string_param(
            "working_dir",
            "Working directory to execute the command in (defaults to user home)",
            false,
        )
        .default_value("working_dir", "")
        .string_param("command", "Shell command to execute", true)
        .build()
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> ToolResult {
        match self.run(ctx, params).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => e.into(),
        }
    }
}
