//! # repl-server
//!
//! MCP tool server for repl: JSON-RPC 2.0, one message per line over stdio.

pub mod mcp;
pub mod server;
pub mod transport;

pub use mcp::McpTool;
pub use server::{ReplServer, PROTOCOL_VERSION, SERVER_NAME};
pub use transport::{serve, serve_stdio, SHUTDOWN_GRACE};
