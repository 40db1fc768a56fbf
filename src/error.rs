//! Error types for the MCP server.
//!
//! Splits failures into validation errors (never reach the network), upstream
//! errors (from the OpenStates API), and envelope errors (JSON-RPC level).

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Failures talking to the OpenStates API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// The request did not complete within the configured timeout.
    #[error("upstream request timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error detail extracted from the response body
        message: String,
        /// Seconds from a `Retry-After` header, if any
        retry_after: Option<u64>,
    },

    /// The connection could not be established or was dropped.
    #[error("upstream connection failed: {0}")]
    Connection(String),

    /// A success response whose body was not valid JSON.
    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Classify a reqwest failure.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { timeout }
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            UpstreamError::Http {
                status: status.as_u16(),
                message: err.to_string(),
                retry_after: None,
            }
        } else {
            UpstreamError::Connection(err.to_string())
        }
    }

    /// Build an HTTP error from a status and raw response body.
    ///
    /// OpenStates reports errors as `{"detail": "..."}`; anything else is kept verbatim.
    pub fn from_response(status: u16, body: &str, retry_after: Option<u64>) -> Self {
        let message = serde_json::from_str::<JsonValue>(body)
            .ok()
            .and_then(|v| v.get("detail").map(detail_to_string))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    trimmed.to_string()
                }
            });

        UpstreamError::Http {
            status,
            message,
            retry_after,
        }
    }
}

fn detail_to_string(detail: &JsonValue) -> String {
    match detail {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum McpError {
    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Error from the OpenStates API.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Invalid startup configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// The error object returned inside a failed tool result.
#[derive(Debug, Clone, Serialize)]
pub struct ToolErrorBody {
    /// Stable error kind, e.g. `validation_error`
    pub kind: &'static str,
    /// Human-readable detail
    pub detail: String,
    /// Upstream HTTP status, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Upstream `Retry-After`, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => rpc_codes::INVALID_PARAMS,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }

    /// Stable kind string reported to MCP clients.
    pub fn kind(&self) -> &'static str {
        match self {
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => "validation_error",
            McpError::Upstream(UpstreamError::Timeout { .. }) => "upstream_timeout",
            McpError::Upstream(UpstreamError::Connection(_)) => "upstream_connection_error",
            McpError::Upstream(UpstreamError::Http { .. }) => "upstream_http_error",
            McpError::Upstream(UpstreamError::Decode(_)) | McpError::Internal(_) => {
                "internal_error"
            }
            McpError::UnknownTool(_) => "unknown_tool",
            McpError::Config(_) => "config_error",
            McpError::Protocol(_) => "protocol_error",
            McpError::Io(_) => "io_error",
        }
    }

    /// Whether the error belongs in a tool result rather than a JSON-RPC error.
    ///
    /// Validation and upstream failures are the tool's answer; an unknown tool
    /// or a malformed envelope is the caller's mistake at the protocol level.
    pub fn is_tool_error(&self) -> bool {
        !matches!(
            self,
            McpError::UnknownTool(_) | McpError::Protocol(_) | McpError::Io(_)
        )
    }

    /// Upstream HTTP status carried by this error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            McpError::Upstream(UpstreamError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Structured body for an `isError` tool result.
    pub fn to_tool_error(&self) -> ToolErrorBody {
        let retry_after_secs = match self {
            McpError::Upstream(UpstreamError::Http { retry_after, .. }) => *retry_after,
            _ => None,
        };
        ToolErrorBody {
            kind: self.kind(),
            detail: self.to_string(),
            status: self.upstream_status(),
            retry_after_secs,
        }
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;
