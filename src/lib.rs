//! # openstates-mcp
//!
//! MCP (Model Context Protocol) server for the OpenStates legislative data API.
//!
//! This crate exposes the OpenStates v3 REST API as tools for AI agents. Each
//! tool validates its arguments, issues exactly one GET to the API, and returns
//! the JSON body. The server speaks JSON-RPC 2.0 over stdin/stdout or HTTP.
//!
//! ## Features
//!
//! - **12 tools** covering bills, people, committees, events, jurisdictions, and status
//! - **Structured errors**: validation and upstream failures come back as tool results
//!   with a machine-readable `kind`
//! - **Two transports**: stdio for desktop clients, `POST /mcp` for network clients
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "openstates": {
//!       "command": "/path/to/openstates-mcp",
//!       "env": { "OPENSTATES_API_KEY": "your-key" }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, you can use the library API:
//!
//! ```no_run
//! use std::sync::Arc;
//! use openstates_mcp::{McpServer, Settings, ToolContext, DEFAULT_BASE_URL};
//!
//! # async fn run() -> openstates_mcp::Result<()> {
//! let settings = Settings::new(DEFAULT_BASE_URL.parse().unwrap(), "your-key");
//! let server = Arc::new(McpServer::new(ToolContext::new(settings)?));
//!
//! // Run the server (reads from stdin, writes to stdout)
//! server.run_stdio().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
mod context;
mod error;
pub mod models;
mod query;
mod server;
pub mod tools;
pub mod validate;

pub use client::{OpenStatesClient, UpstreamResponse};
pub use config::{ServerArgs, Settings, Transport, DEFAULT_BASE_URL};
pub use context::ToolContext;
pub use error::{rpc_codes, McpError, Result, ToolErrorBody, UpstreamError};
pub use query::UpstreamQuery;
pub use server::{router, JsonRpcRequest, JsonRpcResponse, McpServer};
pub use tools::{ToolDef, ToolRegistry, UpstreamCall};
