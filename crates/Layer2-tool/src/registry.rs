//! Tool Registry - manages available tools

use crate::{Tool, ToolContext, ToolDef, ToolResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Registry of available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry with default builtin tools
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(crate::builtin::python::PythonTool::new()));
        registry.register(Arc::new(crate::builtin::python_session::PythonSessionTool::new()));
        registry.register(Arc::new(crate::builtin::shell::ShellTool::new()));
        registry.register(Arc::new(crate::builtin::shell_status::ShellStatusTool::new()));
        registry.register(Arc::new(crate::builtin::perl::PerlTool::new()));

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All tool definitions, ordered by name
    pub fn definitions(&self) -> Vec<ToolDef> {
        let mut defs: Vec<ToolDef> = self.tools.values().map(|tool| tool.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, ctx: &ToolContext, params: Value) -> ToolResult {
        match self.get(name) {
            Some(tool) => tool.execute(ctx, params).await,
            None => {
                warn!("Unknown tool requested: {}", name);
                ToolResult::error(format!("Unknown tool: {}", name))
            }
        }
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = ToolRegistry::with_builtins();
        assert_eq!(registry.len(), 5);

        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["perl", "python", "python_session", "shell", "shell_status"]
        );
    }

    #[test]
    fn test_required_arguments_advertised() {
        let registry = ToolRegistry::with_builtins();
        let shell = registry.get("shell").unwrap().definition();
        assert_eq!(shell.parameters.required, vec!["command".to_string()]);
        assert_eq!(
            shell.parameters.properties["shell"]["enum"],
            serde_json::json!(["bash", "sh", "zsh"])
        );

        let perl = registry.get("perl").unwrap().definition();
        assert_eq!(perl.parameters.required.len(), 2);
    }
}
