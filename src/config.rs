//! Server configuration.
//!
//! Every option can come from a flag or an environment variable. The raw
//! [`ServerArgs`] are validated once into an immutable [`Settings`].

use clap::{Parser, ValueEnum};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::{McpError, Result};

/// Default OpenStates API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://v3.openstates.org";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// How the MCP envelope is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    Http,
}

impl Transport {
    /// Name reported by the status tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
        }
    }
}

/// MCP server for the OpenStates legislative data API.
///
/// Exposes bills, people, committees, events, and jurisdictions as MCP tools
/// for AI agents.
#[derive(Debug, Clone, Parser)]
#[command(name = "openstates-mcp")]
#[command(version, about, long_about = None)]
pub struct ServerArgs {
    /// OpenStates API base URL.
    #[arg(long, env = "OPENSTATES_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// OpenStates API key.
    #[arg(long, env = "OPENSTATES_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "OPENSTATES_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Connect timeout in seconds.
    #[arg(long, env = "OPENSTATES_CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout: u64,

    /// Upstream rate limit (requests per minute), reported by `status`.
    #[arg(long, env = "OPENSTATES_RATE_LIMIT", default_value_t = 50)]
    pub rate_limit: u32,

    /// Cache TTL in seconds, reported by `status`.
    #[arg(long, env = "OPENSTATES_CACHE_TTL", default_value_t = 300)]
    pub cache_ttl: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "OPENSTATES_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Force debug logging.
    #[arg(long, env = "OPENSTATES_DEBUG")]
    pub debug: bool,

    /// Deployment environment name.
    #[arg(long, env = "ENVIRONMENT", default_value = "production")]
    pub environment: String,

    /// Host to bind for the HTTP transport.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind for the HTTP transport.
    #[arg(long, env = "MCP_PORT", default_value_t = 8795)]
    pub port: u16,

    /// Transport to serve MCP over.
    #[arg(long, env = "MCP_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

/// Validated, immutable settings shared by every tool call.
#[derive(Clone)]
pub struct Settings {
    /// Upstream API base URL
    pub base_url: Url,
    /// API key sent as `x-api-key`
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Upstream rate limit, requests per minute
    pub rate_limit: u32,
    /// Cache TTL; no cache is kept, the value is only reported
    pub cache_ttl: Duration,
    /// Normalized lower-case log level
    pub log_level: String,
    /// Debug flag
    pub debug: bool,
    /// Deployment environment name
    pub environment: String,
    /// HTTP bind host
    pub host: String,
    /// HTTP bind port
    pub port: u16,
    /// Active transport
    pub transport: Transport,
}

impl Settings {
    /// Settings with defaults for everything except the endpoint and key.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            rate_limit: 50,
            cache_ttl: Duration::from_secs(300),
            log_level: "info".to_string(),
            debug: false,
            environment: "production".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8795,
            transport: Transport::Stdio,
        }
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether this is a development deployment.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Whether debug output is enabled by flag or level.
    pub fn is_debug_enabled(&self) -> bool {
        self.debug || self.log_level == "debug" || self.log_level == "trace"
    }

    /// The effective tracing level for this crate.
    pub fn effective_log_level(&self) -> &str {
        if self.debug && self.log_level != "trace" {
            "debug"
        } else {
            &self.log_level
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("rate_limit", &self.rate_limit)
            .field("cache_ttl", &self.cache_ttl)
            .field("log_level", &self.log_level)
            .field("debug", &self.debug)
            .field("environment", &self.environment)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("transport", &self.transport)
            .finish()
    }
}

impl TryFrom<ServerArgs> for Settings {
    type Error = McpError;

    fn try_from(args: ServerArgs) -> Result<Self> {
        let api_key = args
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                McpError::Config(
                    "OPENSTATES_API_KEY is not set; pass --api-key or set the environment variable"
                        .to_string(),
                )
            })?;

        let base_url = Url::parse(args.base_url.trim())
            .map_err(|e| McpError::Config(format!("invalid base URL '{}': {}", args.base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(McpError::Config(format!(
                "base URL must be http or https, got '{}'",
                base_url.scheme()
            )));
        }

        if args.timeout == 0 {
            return Err(McpError::Config("timeout must be greater than zero".to_string()));
        }
        if args.connect_timeout == 0 {
            return Err(McpError::Config(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        if args.rate_limit == 0 {
            return Err(McpError::Config("rate limit must be greater than zero".to_string()));
        }

        let log_level = args.log_level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(McpError::Config(format!(
                "unknown log level '{}', expected one of {}",
                args.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(args.timeout),
            connect_timeout: Duration::from_secs(args.connect_timeout),
            rate_limit: args.rate_limit,
            cache_ttl: Duration::from_secs(args.cache_ttl),
            log_level,
            debug: args.debug || args.verbose,
            environment: args.environment,
            host: args.host,
            port: args.port,
            transport: args.transport,
        })
    }
}
