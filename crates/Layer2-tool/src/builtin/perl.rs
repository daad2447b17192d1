//! Perl tool - in-place file text substitution

use crate::output::CodeOutput;
use crate::r#trait::parse_params;
use crate::{Tool, ToolContext, ToolDef, ToolResult};
use async_trait::async_trait;
use repl_foundation::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

pub struct PerlTool;

#[derive(Debug, Deserialize)]
struct PerlParams {
    #[serde(default, alias = "filePath")]
    file_path: String,
    #[serde(default, alias = "perlScript")]
    perl_script: String,
}

impl PerlTool {
    pub fn new() -> Self {
        Self
    }

    /// Wrap the caller's substitutions: file text arrives in `$content`,
    /// trailing whitespace is stripped, the result goes to stdout.
    fn wrap_script(perl_script: &str) -> String {
        format!(
            "use strict;\n\
             use warnings;\n\
             no warnings 'uninitialized';\n\
             use utf8;\n\
             binmode(STDIN, ':utf8');\n\
             binmode(STDOUT, ':utf8');\n\
             local $/;\n\
             my $content = <STDIN>;\n\
             {}\n\
             $content =~ s/[ \\t]+$//mg;\n\
             print $content;\n",
            perl_script
        )
    }

    async fn run_perl(perl: &Path, file_path: &Path, perl_script: &str) -> std::io::Result<Output> {
        let input = tokio::fs::File::open(file_path).await?.into_std().await;
        Command::new(perl)
            .arg("-e")
            .arg(Self::wrap_script(perl_script))
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
    }

    async fn apply(perl: &Path, file_path: &Path, perl_script: &str) -> CodeOutput {
        let started = Instant::now();
        let mut output = CodeOutput::default();

        let ran = Self::run_perl(perl, file_path, perl_script).await;

        match ran {
            Ok(result) => {
                let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
                if result.status.success() || stderr.contains("Wide character") {
                    let modified = String::from_utf8_lossy(&result.stdout).into_owned();
                    if modified.is_empty() {
                        output.stderr = "Error: Perl script produced empty output".into();
                        output.result = Some("1".into());
                    } else {
                        match tokio::fs::write(file_path, modified).await {
                            Ok(()) => {
                                info!("perl: modified {}", file_path.display());
                                output.stdout = "File modified successfully".into();
                            }
                            Err(e) => {
                                output.stderr = format!("Error writing file: {}", e);
                                output.result = Some("1".into());
                            }
                        }
                    }
                } else {
                    output.stderr = stderr;
                    output.result = result.status.code().map(|c| c.to_string());
                }
            }
            Err(e) => {
                output.stderr = format!("Error executing Perl script: {}", e);
                output.result = Some("1".into());
            }
        }

        output.execution_time = Some(started.elapsed());
        output
    }

    async fn run(&self, params: Value) -> Result<String> {
        let params: PerlParams = parse_params(params)?;
        if params.file_path.trim().is_empty() {
            return Err(Error::missing_argument("file_path"));
        }
        if params.perl_script.trim().is_empty() {
            return Err(Error::missing_argument("perl_script"));
        }

        let file_path = PathBuf::from(&params.file_path);
        if !file_path.is_file() {
            return Err(Error::Validation(format!(
                "File does not exist: {}",
                file_path.display()
            )));
        }

        let perl = match which::which("perl") {
            Ok(path) => path,
            Err(e) => {
                return Ok(CodeOutput {
                    stderr: format!("Error executing Perl script: perl not found ({})", e),
                    result: Some("1".into()),
                    ..Default::default()
                }
                .format())
            }
        };
        debug!("perl: applying script to {} with {}", file_path.display(), perl.display());

        Ok(Self::apply(&perl, &file_path, &params.perl_script).await.format())
    }
}

impl Default for PerlTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for PerlTool {
    fn definition(&self) -> ToolDef {
        ToolDef::builder(
            "perl",
            "Modify files using Perl's text processing capabilities.\n\
             The tool automatically adds strict mode, warnings, and UTF-8 handling.\n\
             The input file content is available in the $content variable.\n\
             Write your Perl substitutions and the modified content will be written back.\n\n\
             Example Perl patterns:\n\
             - Simple replace: $content =~ s/old/new/g;\n\
             - Multi-line replace: $content =~ s/old chunk.*?next chunk/new/s;",
        )
        .string_param("file_path", "Path to the file to modify", true)
        .string_param(
            "perl_script",
            "Perl substitution commands to apply (without boilerplate)",
            true,
        )
        .build()
    }

    async fn execute(&self, _ctx: &ToolContext, params: Value) -> ToolResult {
        match self.run(params).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_script_keeps_user_code() {
        let script = PerlTool::wrap_script("$content =~ s/a/b/g;");
        assert!(script.contains("my $content = <STDIN>;\n$content =~ s/a/b/g;\n"));
        assert!(script.ends_with("print $content;\n"));
    }

    #[tokio::test]
    async fn test_run_perl_feeds_file_on_stdin() {
        let Ok(perl) = which::which("perl") else { return };
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("in.txt");
        std::fs::write(&file, "old text  \n").unwrap();

        let output = PerlTool::run_perl(&perl, &file, "$content =~ s/old/new/;")
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "new text\n");

        let err = PerlTool::run_perl(&perl, &dir.path().join("missing.txt"), "1;")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
