//! MCP server implementation.
//!
//! Handles JSON-RPC 2.0 over stdio or HTTP using the MCP tools protocol.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::context::ToolContext;
use crate::error::{rpc_codes, McpError, Result};
use crate::tools::{status, ToolRegistry};

/// MCP protocol version we support.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server information.
const SERVER_NAME: &str = "openstates-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "Access to the OpenStates legislative database. Search bills, \
legislators, committees, events, and jurisdictions across all US states, or fetch a single \
record by ID. Use get_legislators_by_location to find who represents a coordinate, and status \
to check API availability.";

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always `2.0`
    pub jsonrpc: String,
    /// Request id; absent for notifications
    pub id: Option<JsonValue>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Option<JsonValue>,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always `2.0`
    pub jsonrpc: String,
    /// Request id; `null` when the request's id could not be read
    pub id: Option<JsonValue>,
    /// Success payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Error payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// JSON-RPC error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Extra error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<JsonValue>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    /// Create an error response from an McpError.
    pub fn from_error(id: Option<JsonValue>, err: McpError) -> Self {
        Self::error(id, err.rpc_code(), err.to_string())
    }
}

/// MCP server.
///
/// Shared behind an `Arc`; every request runs on its own task.
pub struct McpServer {
    ctx: ToolContext,
    registry: ToolRegistry,
    initialized: AtomicBool,
}

impl McpServer {
    /// Create a new MCP server with the given context.
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            ctx,
            registry: ToolRegistry::new(),
            initialized: false.into(),
        }
    }

    /// The registered tools.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The shared tool context.
    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Whether a client has completed `initialize`.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Run the server, reading from stdin and writing to stdout.
    pub async fn run_stdio(self: Arc<Self>) -> Result<()> {
        info!("serving MCP over stdio");
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await?;
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC until `reader` hits EOF.
    ///
    /// Each line is handled on its own task. Responses go through a channel
    /// to a single writer so concurrent replies never interleave. Returns the
    /// writer once every in-flight request has answered.
    pub async fn serve<R, W>(self: Arc<Self>, mut reader: R, writer: W) -> Result<W>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<W, std::io::Error>(writer)
        });

        let mut buf = Vec::new();
        let outcome = loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                // EOF - client disconnected
                Ok(0) => break Ok(()),
                Ok(_) => {}
                Err(e) => break Err(e),
            }

            let request = match std::str::from_utf8(&buf) {
                Ok(text) => text.trim(),
                Err(e) => {
                    warn!(error = %e, "request line is not valid UTF-8");
                    let response = JsonRpcResponse::error(
                        None,
                        rpc_codes::PARSE_ERROR,
                        format!("Parse error: {}", e),
                    );
                    send_response(&tx, &response);
                    continue;
                }
            };
            if request.is_empty() {
                continue;
            }

            let server = Arc::clone(&self);
            let tx = tx.clone();
            let request = request.to_string();
            tokio::spawn(async move {
                if let Some(response) = server.handle_line(&request).await {
                    send_response(&tx, &response);
                }
            });
        };

        // In-flight requests still answer before the writer is returned.
        drop(tx);
        let writer = writer_task
            .await
            .map_err(|e| McpError::Internal(format!("writer task failed: {}", e)))??;
        outcome?;
        Ok(writer)
    }

    /// Serve MCP over HTTP on the configured host and port.
    pub async fn run_http(self: Arc<Self>) -> Result<()> {
        let addr = format!("{}:{}", self.ctx.settings().host, self.ctx.settings().port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("serving MCP over HTTP on {}", addr);

        axum::serve(listener, router(self)).await?;
        Ok(())
    }

    /// Parse and handle one raw JSON-RPC message.
    ///
    /// Invalid JSON is a parse error; valid JSON that is not a request object
    /// is an invalid request, answered with the request's id when it has one.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let message: JsonValue = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    rpc_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        };

        let id = message.get("id").filter(|id| !id.is_null()).cloned();
        match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                rpc_codes::INVALID_REQUEST,
                format!("Invalid request: {}", e),
            )),
        }
    }

    /// Handle a single JSON-RPC request. Notifications get no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, id = ?request.id, "handling request");

        // Notifications are never answered, not even with an error.
        if request.id.is_none() {
            if request.jsonrpc == "2.0"
                && (request.method == "notifications/initialized"
                    || request.method == "initialized")
            {
                self.initialized.store(true, Ordering::Relaxed);
            }
            return None;
        }

        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                rpc_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version".to_string(),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id,
                rpc_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            ),
        };
        Some(response)
    }

    /// Handle the initialize request.
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.initialized.store(true, Ordering::Relaxed);

        JsonRpcResponse::success(
            request.id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                },
                "instructions": INSTRUCTIONS
            }),
        )
    }

    /// Handle the tools/list request.
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools: Vec<JsonValue> = self
            .registry
            .tools()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
    }

    /// Handle the tools/call request.
    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        // Extract name and arguments from params
        let params = match &request.params {
            Some(JsonValue::Object(obj)) => obj,
            _ => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "Missing params object".to_string(),
                )
            }
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "Missing 'name' in params".to_string(),
                )
            }
        };

        let arguments = match params.get("arguments") {
            Some(JsonValue::Object(obj)) => obj.clone(),
            Some(JsonValue::Null) | None => Map::new(),
            _ => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "'arguments' must be an object".to_string(),
                )
            }
        };

        // Dispatch the tool call
        match self.registry.dispatch(&self.ctx, &name, arguments).await {
            Ok(result) => JsonRpcResponse::success(request.id, tool_result(&result, false)),
            Err(err) if err.is_tool_error() => {
                warn!(tool = %name, kind = err.kind(), error = %err, "tool call failed");
                let body = serde_json::json!({ "error": err.to_tool_error() });
                JsonRpcResponse::success(request.id, tool_result(&body, true))
            }
            Err(err) => JsonRpcResponse::from_error(request.id, err),
        }
    }
}

fn send_response(tx: &mpsc::UnboundedSender<String>, response: &JsonRpcResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            if tx.send(json).is_err() {
                warn!("response dropped, writer closed");
            }
        }
        Err(e) => error!(error = %e, "failed to serialize response"),
    }
}

/// MCP tool responses are wrapped in a content array.
fn tool_result(payload: &JsonValue, is_error: bool) -> JsonValue {
    serde_json::json!({
        "content": [{
            "type": "text",
            "text": serde_json::to_string(payload).unwrap_or_else(|_| "null".to_string())
        }],
        "isError": is_error
    })
}

/// HTTP routes: `POST /mcp` for JSON-RPC and `GET /health` for liveness.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_post))
        .route("/health", get(health))
        .with_state(server)
}

async fn mcp_post(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_line(&body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health(State(server): State<Arc<McpServer>>) -> Json<status::HealthReport> {
    Json(status::check(server.context(), false).await)
}
