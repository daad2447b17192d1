//! Tool trait and related types

use async_trait::async_trait;
use repl_foundation::{Error, PythonSettings, ReplConfig, ShellSettings};
use repl_session::SessionRegistry;
use repl_task::TaskManager;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Definition of a tool, as advertised to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (unique identifier)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for parameters
    pub parameters: ToolParameters,
}

/// Parameters schema for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameters {
    /// Type (usually "object")
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Properties (parameter definitions)
    pub properties: Value,

    /// Required parameters
    #[serde(default)]
    pub required: Vec<String>,
}

impl ToolDef {
    /// Create a new tool definition builder
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> ToolDefBuilder {
        ToolDefBuilder::new(name, description)
    }
}

/// Builder for ToolDef
pub struct ToolDefBuilder {
    name: String,
    description: String,
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
}

impl ToolDefBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: serde_json::Map::new(),
            required: vec![],
        }
    }

    /// Add a string parameter
    pub fn string_param(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            serde_json::json!({
                "type": "string",
                "description": description.into()
            }),
        );
        if required {
            self.required.push(name);
        }
        self
    }

    /// Add an enum parameter
    pub fn enum_param(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: Vec<&str>,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            serde_json::json!({
                "type": "string",
                "description": description.into(),
                "enum": values
            }),
        );
        if required {
            self.required.push(name);
        }
        self
    }

    /// Attach a `default` to an already-added parameter
    pub fn default_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Some(Value::Object(schema)) = self.properties.get_mut(name) {
            schema.insert("default".to_string(), value.into());
        }
        self
    }

    /// Build the ToolDef
    pub fn build(self) -> ToolDef {
        ToolDef {
            name: self.name,
            description: self.description,
            parameters: ToolParameters {
                schema_type: "object".to_string(),
                properties: Value::Object(self.properties),
                required: self.required,
            },
        }
    }
}

/// Context provided to tools during execution
///
/// Registries are shared handles; cloning the context shares state.
#[derive(Clone)]
pub struct ToolContext {
    /// Interpreter sessions
    pub sessions: SessionRegistry,

    /// Command tasks
    pub tasks: TaskManager,

    /// Shell defaults
    pub shell: ShellSettings,

    /// Python defaults for one-shot execution
    pub python: PythonSettings,
}

impl ToolContext {
    pub fn new(sessions: SessionRegistry, tasks: TaskManager, config: &ReplConfig) -> Self {
        Self {
            sessions,
            tasks,
            shell: config.shell.clone(),
            python: config.python.clone(),
        }
    }
}

/// Result of tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution was successful
    pub success: bool,

    /// Result content (text output)
    pub content: String,

    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a success result
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            error: Some(message.into()),
        }
    }

    /// Text the caller sees, whichever way it went
    pub fn text(&self) -> &str {
        match &self.error {
            Some(error) => error,
            None => &self.content,
        }
    }
}

impl From<Error> for ToolResult {
    fn from(error: Error) -> Self {
        ToolResult::error(error.to_string())
    }
}

/// Deserialize tool arguments, reporting shape errors as validation errors
pub fn parse_params<T: DeserializeOwned>(params: Value) -> repl_foundation::Result<T> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(params)
        .map_err(|e| Error::Validation(format!("Invalid parameters: {}", e)))
}

/// Treat an empty string the same as an absent argument
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Tool trait - implement this to create a new tool
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> ToolDef;

    /// Execute the tool with given parameters
    async fn execute(&self, ctx: &ToolContext, params: Value) -> ToolResult;

    /// Get the tool name (convenience method)
    fn name(&self) -> String {
        self.definition().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_schema() {
        let def = ToolDef::builder("shell", "Run a command")
            .string_param("command", "Command text", true)
            .enum_param("shell", "Shell", vec!["bash", "sh"], false)
            .default_value("shell", "bash")
            .build();

        assert_eq!(def.parameters.required, vec!["command".to_string()]);
        assert_eq!(def.parameters.properties["shell"]["default"], "bash");
        assert_eq!(def.parameters.properties["shell"]["enum"][1], "sh");

        let schema = serde_json::to_value(&def.parameters).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn test_parse_params_null_is_empty_object() {
        #[derive(Debug, Deserialize)]
        struct Params {
            #[serde(default)]
            code: String,
        }
        let params: Params = parse_params(Value::Null).unwrap();
        assert!(params.code.is_empty());

        let err = parse_params::<Params>(serde_json::json!({"code": 5})).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_result_text() {
        assert_eq!(ToolResult::success("ok").text(), "ok");
        let err: ToolResult = Error::missing_argument("code").into();
        assert!(!err.success);
        assert_eq!(err.text(), "Validation error: Missing code parameter");
    }
}
