//! Server status tool.
//!
//! Tools: status

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;
use std::time::Instant;
use sysinfo::{ProcessesToUpdate, System};
use tracing::{info, warn};

use crate::client::millis;
use crate::context::ToolContext;
use crate::error::{McpError, Result, UpstreamError};
use crate::query::UpstreamQuery;
use crate::schema;
use crate::tools::ToolDef;

/// Service name reported in status output.
pub const SERVICE_NAME: &str = "OpenStates MCP Server";

const TOOL_GROUPS: &[&str] = &["bills", "people", "committees", "events", "jurisdictions"];

/// Overall health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Process up, upstream answering.
    Ok,
    /// Upstream reachable but returning errors.
    Degraded,
    /// Upstream unreachable.
    Down,
}

/// Result of the upstream probe.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamHealth {
    /// Configured API base URL
    pub base_url: String,
    /// Whether the probe ran
    pub checked: bool,
    /// Whether the API answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
    /// Status of the probe response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Probe round trip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Probe failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where the process is running.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentInfo {
    /// `docker` or `native`
    pub runtime: &'static str,
    /// Running inside a container
    pub docker: bool,
    /// Deployment environment name
    pub name: String,
}

/// Resource usage of this process.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    /// Uptime as `HH:MM:SS`
    pub process_uptime: String,
    /// Resident memory in MiB, one decimal
    pub memory_mb: Option<f64>,
    /// CPU usage over a short sample, one decimal
    pub cpu_percent: Option<f64>,
}

/// Effective server configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Active transport
    pub transport: &'static str,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Tool groups served
    pub tools_available: Vec<&'static str>,
    /// Whether an API key is set
    pub api_configured: bool,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Configured requests per minute
    pub rate_limit: u32,
    /// Configured cache TTL
    pub cache_ttl_secs: u64,
}

/// The full status report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Overall health
    pub status: HealthStatus,
    /// Human-readable summary
    pub detail: String,
    /// Service name
    pub service: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Report time, RFC 3339
    pub timestamp: String,
    /// Uptime as `HH:MM:SS`
    pub uptime: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Upstream probe result
    pub upstream: UpstreamHealth,
    /// Runtime environment
    pub environment: EnvironmentInfo,
    /// Process resource usage
    pub system: SystemInfo,
    /// Server configuration
    pub server: ServerInfo,
}

/// Get all status tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "status",
        "Check the health of this server and the OpenStates API. Returns status ok, \
         degraded, or down with a detail message, plus uptime and configuration.",
        schema!(object {
            optional: {
                "check_upstream": boolean => "Probe the OpenStates API (default true)"
            }
        }),
    )]
}

/// Dispatch a status tool call.
pub async fn dispatch(
    ctx: &ToolContext,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "status" => {
            // A malformed flag falls back to the default; status always answers.
            let probe = args
                .get("check_upstream")
                .and_then(JsonValue::as_bool)
                .unwrap_or(true);
            info!(probe, "status check requested");
            let report = check(ctx, probe).await;
            Ok(serde_json::to_value(report)?)
        }
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Build a health report, probing the upstream when `probe` is set. Never fails.
pub async fn check(ctx: &ToolContext, probe: bool) -> HealthReport {
    let settings = ctx.settings();
    let mut upstream = UpstreamHealth {
        base_url: settings.base_url.to_string(),
        checked: probe,
        reachable: None,
        http_status: None,
        latency_ms: None,
        error: None,
    };

    let (status, detail) = if probe {
        let mut query = UpstreamQuery::new();
        query.push("per_page", 1);
        let started = Instant::now();
        let outcome = ctx.client().get(&["jurisdictions"], &query).await;
        upstream.latency_ms = Some(millis(started.elapsed()));

        match outcome {
            Ok(response) => {
                upstream.reachable = Some(true);
                upstream.http_status = Some(response.status);
                (HealthStatus::Ok, "OpenStates API reachable".to_string())
            }
            Err(err) => {
                warn!(error = %err, "upstream probe failed");
                let status = classify(&err);
                upstream.reachable = Some(status == HealthStatus::Degraded);
                if let UpstreamError::Http { status, .. } = &err {
                    upstream.http_status = Some(*status);
                }
                upstream.error = Some(err.to_string());
                let detail = match status {
                    HealthStatus::Down => format!("OpenStates API unreachable: {}", err),
                    _ => format!("OpenStates API answered with an error: {}", err),
                };
                (status, detail)
            }
        }
    } else {
        (
            HealthStatus::Ok,
            "process alive; upstream check skipped".to_string(),
        )
    };

    let uptime_secs = ctx.started_at().elapsed().as_secs();
    let uptime = format_uptime(uptime_secs);
    let docker = is_docker();
    let system = system_info(uptime.clone()).await;

    HealthReport {
        status,
        detail,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime,
        uptime_secs,
        upstream,
        environment: EnvironmentInfo {
            runtime: if docker { "docker" } else { "native" },
            docker,
            name: settings.environment.clone(),
        },
        system,
        server: ServerInfo {
            transport: settings.transport.as_str(),
            host: settings.host.clone(),
            port: settings.port,
            tools_available: TOOL_GROUPS.to_vec(),
            api_configured: !settings.api_key.is_empty(),
            timeout_secs: settings.timeout.as_secs(),
            rate_limit: settings.rate_limit,
            cache_ttl_secs: settings.cache_ttl.as_secs(),
        },
    }
}

/// Timeouts and refused connections mean down; any answer from the upstream means degraded.
pub fn classify(err: &UpstreamError) -> HealthStatus {
    match err {
        UpstreamError::Timeout { .. } | UpstreamError::Connection(_) => HealthStatus::Down,
        UpstreamError::Http { .. } | UpstreamError::Decode(_) => HealthStatus::Degraded,
    }
}

/// Sample memory and CPU for this process.
///
/// CPU usage needs two refreshes at least `MINIMUM_CPU_UPDATE_INTERVAL` apart.
async fn system_info(process_uptime: String) -> SystemInfo {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return SystemInfo {
            process_uptime,
            memory_mb: None,
            cpu_percent: None,
        };
    };

    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    let process = sys.process(pid);
    SystemInfo {
        process_uptime,
        memory_mb: process.map(|p| round1(p.memory() as f64 / 1024.0 / 1024.0)),
        cpu_percent: process.map(|p| round1(f64::from(p.cpu_usage()))),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn is_docker() -> bool {
    if Path::new("/.dockerenv").exists() {
        return true;
    }
    std::fs::read_to_string("/proc/1/cgroup")
        .map(|cgroup| cgroup.contains("docker"))
        .unwrap_or(false)
}
