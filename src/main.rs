//! MCP server for the OpenStates API.
//!
//! Run with `OPENSTATES_API_KEY=... openstates-mcp` for stdio, or
//! `openstates-mcp --transport http` to serve `POST /mcp`.

use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use openstates_mcp::{McpServer, ServerArgs, Settings, ToolContext, Transport};

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    let settings = match Settings::try_from(args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Logs go to stderr; stdout carries the protocol.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("openstates_mcp={}", settings.effective_log_level()))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if settings.is_development() {
        warn!("running in development mode");
    }
    if settings.is_debug_enabled() {
        debug!(?settings, "loaded settings");
    }
    info!(
        base_url = %settings.base_url,
        transport = settings.transport.as_str(),
        "starting openstates-mcp v{}",
        env!("CARGO_PKG_VERSION")
    );

    let transport = settings.transport;
    let ctx = match ToolContext::new(settings) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let server = Arc::new(McpServer::new(ctx));

    let outcome = match transport {
        Transport::Stdio => server.run_stdio().await,
        Transport::Http => server.run_http().await,
    };

    if let Err(e) = outcome {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
