//! Python session tool - run code in a persistent interpreter

use crate::output::CodeOutput;
use crate::r#trait::{non_empty, parse_params};
use crate::{Tool, ToolContext, ToolDef, ToolResult};
use async_trait::async_trait;
use repl_foundation::{Error, Result};
use repl_session::SessionId;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub struct PythonSessionTool;

#[derive(Debug, Deserialize)]
struct PythonSessionParams {
    #[serde(default)]
    code: String,
    #[serde(default, alias = "sessionId")]
    session_id: Option<String>,
}

impl PythonSessionTool {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let params: PythonSessionParams = parse_params(params)?;
        if params.code.trim().is_empty() {
            return Err(Error::missing_argument("code"));
        }

        let mut response = Vec::new();
        let session_id = match non_empty(params.session_id) {
            Some(id) => id.parse::<SessionId>()?,
            None => {
                let id = ctx.sessions.create_session();
                response.push(format!("Created new session: {}", id));
                id
            }
        };

        debug!("python_session: executing in {}", session_id);
        let output = ctx.sessions.execute(session_id, &params.code).await?;

        response.push(format!("Session: {}", session_id));
        response.push(
            CodeOutput {
                execution_time: Some(output.execution_time),
                stdout: output.stdout,
                stderr: output.stderr,
                result: output.result,
            }
            .format(),
        );
        Ok(response.join("\n"))
    }
}

impl Default for PythonSessionTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for PythonSessionTool {
    fn definition(&self) -> ToolDef {
        ToolDef::builder(
            "python_session",
            "Execute Python code in a persistent interpreter session.\n\n\
             Variables, imports and definitions persist between calls that use the same \
             session_id. Leave session_id empty to create a new session; its id is returned \
             in the response. Sessions idle for 5 minutes are discarded.",
        )
        .string_param(
            "session_id",
            "Session ID (leave empty to create new session)",
            false,
        )
        .string_param("code", "Python code to execute", true)
        .build()
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> ToolResult {
        match self.run(ctx, params).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => e.into(),
        }
    }
}
