//! MCP wire types
//!
//! - JSON-RPC 2.0 envelopes
//! - Tool listing and tool call payloads

pub mod jsonrpc;
pub mod types;

pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use types::{McpContent, McpTool, McpToolCall, McpToolResult};
