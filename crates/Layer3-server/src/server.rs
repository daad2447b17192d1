//! Request dispatch

use crate::mcp::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpTool, McpToolCall, McpToolResult};
use repl_tool::{ToolContext, ToolRegistry};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "repl";

/// Tool server: owns the tool registry and the shared execution context
pub struct ReplServer {
    tools: ToolRegistry,
    ctx: ToolContext,
}

impl ReplServer {
    pub fn new(tools: ToolRegistry, ctx: ToolContext) -> Self {
        Self { tools, ctx }
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Start background services
    pub fn start(&self) {
        self.ctx.sessions.start();
    }

    /// Stop background services. Detached command tasks keep running.
    pub async fn shutdown(&self) {
        self.ctx.sessions.stop().await;
        let running = self.ctx.tasks.running_count().await;
        if running > 0 {
            info!("Leaving {} background command(s) running", running);
        }
    }

    /// Handle one raw input line; `None` when no reply is due
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparsable message: {}", e);
                return Some(JsonRpcResponse::failure(Value::Null, JsonRpcError::parse_error()));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed request: {}", e);
                return Some(JsonRpcResponse::failure(id, JsonRpcError::invalid_request()));
            }
        };

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("<- {}", request.method);

        if request.jsonrpc != "2.0" {
            let id = request.id.unwrap_or(Value::Null);
            return Some(JsonRpcResponse::failure(id, JsonRpcError::invalid_request()));
        }

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(request.params).await,
            method if method.starts_with("notifications/") => {
                debug!("Notification {}", method);
                return None;
            }
            method => Err(JsonRpcError::method_not_found(method)),
        };

        // Notifications never get a reply, even on error
        let id = request.id?;
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self) -> Value {
        info!("Client initialized session");
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn list_tools(&self) -> Result<Value, JsonRpcError> {
        let tools: Vec<McpTool> = self.tools.definitions().into_iter().map(McpTool::from).collect();
        serde_json::to_value(tools)
            .map(|tools| json!({ "tools": tools }))
            .map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
        let call: McpToolCall = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?;

        info!("Calling tool {}", call.name);
        let result = self.tools.execute(&call.name, &self.ctx, call.arguments).await;
        if !result.success {
            debug!("Tool {} failed: {}", call.name, result.text());
        }

        serde_json::to_value(McpToolResult::from(result))
            .map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }
}
