//! # repl-tool
//!
//! Tool system for repl providing:
//! - Tool trait and registry
//! - Builtin tools: `python_session`, `shell`, `shell_status`, `python`, `perl`
//! - `CodeOutput`, the text layout shared by every execution result

pub mod builtin;
pub mod output;
pub mod registry;
pub mod r#trait;

pub use output::CodeOutput;
pub use r#trait::{parse_params, Tool, ToolContext, ToolDef, ToolParameters, ToolResult};
pub use registry::ToolRegistry;

// Re-export builtin tools
pub use builtin::{
    perl::PerlTool, python::PythonTool, python_session::PythonSessionTool, shell::ShellTool,
    shell_status::ShellStatusTool,
};
