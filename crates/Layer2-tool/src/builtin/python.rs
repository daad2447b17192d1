//! Python tool - one-shot execution in a fresh interpreter

use crate::output::CodeOutput;
use crate::r#trait::{non_empty, parse_params};
use crate::{Tool, ToolContext, ToolDef, ToolResult};
use async_trait::async_trait;
use repl_foundation::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Reads the program from stdin, runs all but a trailing expression, then
/// evaluates that expression. Prints one JSON line with the captured parts.
const ONESHOT_SCRIPT: &str = r#"
import ast, io, json, sys, traceback

source = sys.stdin.read()
out, err = io.StringIO(), io.StringIO()
sys.stdout, sys.stderr = out, err
result = None
namespace = {"__name__": "__main__"}
try:
    tree = ast.parse(source, "<input>")
    last = None
    if tree.body and isinstance(tree.body[-1], ast.Expr):
        last = ast.Expression(tree.body.pop().value)
    exec(compile(tree, "<input>", "exec"), namespace)
    if last is not None:
        value = eval(compile(last, "<input>", "eval"), namespace)
        if value is not None:
            result = repr(value)
except Exception:
    traceback.print_exc()
finally:
    sys.stdout, sys.stderr = sys.__stdout__, sys.__stderr__
print(json.dumps({"stdout": out.getvalue(), "stderr": err.getvalue(), "result": result}))
"#;

pub struct PythonTool;

#[derive(Debug, Deserialize)]
struct PythonParams {
    #[serde(default)]
    code: String,
    #[serde(default, alias = "pythonPath")]
    python_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OneShotReply {
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
    #[serde(default)]
    result: Option<String>,
}

impl PythonTool {
    pub fn new() -> Self {
        Self
    }

    /// Split raw process stdout into the reply line and anything printed
    /// around the captured streams (e.g. by child processes).
    fn parse_reply(raw: &str) -> Option<(OneShotReply, String)> {
        let trimmed = raw.trim_end_matches('\n');
        let (before, last) = match trimmed.rfind('\n') {
            Some(pos) => (&trimmed[..=pos], &trimmed[pos + 1..]),
            None => ("", trimmed),
        };
        let reply = serde_json::from_str(last).ok()?;
        Some((reply, before.to_string()))
    }

    async fn run_python(python: &str, code: &str) -> Result<(CodeOutput, Option<String>)> {
        let started = Instant::now();
        let mut child = Command::new(python)
            .arg("-c")
            .arg(ONESHOT_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Process(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(code.as_bytes())
                .await
                .map_err(|e| Error::Process(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Process(e.to_string()))?;
        let elapsed = started.elapsed();

        let raw_stdout = String::from_utf8_lossy(&output.stdout);
        let raw_stderr = String::from_utf8_lossy(&output.stderr);

        let (stdout, mut stderr, result) = match Self::parse_reply(&raw_stdout) {
            Some((reply, extra)) => (extra + &reply.stdout, reply.stderr, reply.result),
            None => {
                warn!("python: no reply from interpreter (exit {:?})", output.status.code());
                (raw_stdout.into_owned(), String::new(), None)
            }
        };
        stderr.push_str(&raw_stderr);

        Ok((
            CodeOutput {
                execution_time: Some(elapsed),
                stdout: stdout.trim_end().to_string(),
                stderr: stderr.trim_end().to_string(),
                result: None,
            },
            result,
        ))
    }

    async fn run(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let params: PythonParams = parse_params(params)?;
        if params.code.trim().is_empty() {
            return Err(Error::missing_argument("code"));
        }

        let custom = non_empty(params.python_path);
        let python = custom
            .clone()
            .unwrap_or_else(|| ctx.python.executable().to_string());
        debug!("python: running one-shot code with {}", python);

        let (output, result) = match Self::run_python(&python, &params.code).await {
            Ok(ran) => ran,
            Err(e) => {
                let reason = match e {
                    Error::Process(msg) => msg,
                    other => other.to_string(),
                };
                return Ok(format!("Error executing Python code: {}", reason));
            }
        };

        let mut response = Vec::new();
        if let Some(path) = custom {
            response.push(format!("Using Python: {}", path));
        }
        response.push(output.format());
        if let Some(result) = result {
            response.push(format!("Result: {}", result));
        }
        Ok(response.join("\n"))
    }
}

impl Default for PythonTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for PythonTool {
    fn definition(&self) -> ToolDef {
        ToolDef::builder(
            "python",
            "Execute Python code in a fresh interpreter with timing information.\n\n\
             Each call starts a clean process, nothing persists between calls. \
             The value of a trailing expression is reported as the result.",
        )
        .string_param("code", "Python code to execute", true)
        .string_param(
            "python_path",
            "Optional path to Python executable (defaults to the configured interpreter)",
            false,
        )
        .build()
    }

    async fn execute(&self, ctx: &ToolContext, params: Value) -> ToolResult {
        match self.run(ctx, params).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_with_stray_output() {
        let raw = "from child\n{\"stdout\": \"hi\\n\", \"stderr\": \"\", \"result\": \"3\"}\n";
        let (reply, extra) = PythonTool::parse_reply(raw).unwrap();
        assert_eq!(extra, "from child\n");
        assert_eq!(reply.stdout, "hi\n");
        assert_eq!(reply.result.as_deref(), Some("3"));
    }

    #[test]
    fn test_parse_reply_garbage() {
        assert!(PythonTool::parse_reply("Traceback ...").is_none());
        assert!(PythonTool::parse_reply("").is_none());
    }
}
