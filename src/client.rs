//! HTTP client for the OpenStates API.

use reqwest::{header, Client, StatusCode};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Settings;
use crate::error::{McpError, Result, UpstreamError};
use crate::query::UpstreamQuery;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A decoded upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// HTTP status
    pub status: u16,
    /// Parsed JSON body
    pub body: JsonValue,
}

/// Shared client bound to one base URL and API key.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct OpenStatesClient {
    client: Client,
    settings: Arc<Settings>,
}

impl OpenStatesClient {
    /// Build a client from validated settings.
    pub fn new(settings: Arc<Settings>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(&settings.api_key)
            .map_err(|_| McpError::Config("API key contains invalid header characters".to_string()))?;
        key.set_sensitive(true);
        headers.insert(header::HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| McpError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }

    /// The settings this client was built from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    ///
    /// OpenStates ids such as `ocd-organization/<uuid>` carry a slash; each
    /// piece becomes its own segment so the upstream sees the id verbatim.
    pub fn build_url(&self, segments: &[&str]) -> std::result::Result<Url, UpstreamError> {
        let mut url = self.settings.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                UpstreamError::Connection(format!(
                    "base URL '{}' cannot carry a path",
                    self.settings.base_url
                ))
            })?;
            path.pop_if_empty();
            for piece in segments
                .iter()
                .flat_map(|s| s.split('/'))
                .filter(|p| !p.is_empty())
            {
                path.push(piece);
            }
        }
        Ok(url)
    }

    /// Issue one GET and decode the JSON body.
    ///
    /// Non-2xx statuses become [`UpstreamError::Http`]; there is no retry.
    pub async fn get(
        &self,
        segments: &[&str],
        query: &UpstreamQuery,
    ) -> std::result::Result<UpstreamResponse, UpstreamError> {
        let url = self.build_url(segments)?;
        let timeout = self.settings.timeout;
        debug!(url = %url, query = ?query.pairs(), "GET request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            let err = UpstreamError::from_response(status.as_u16(), &body, retry_after);
            warn!(status = status.as_u16(), error = %err, "upstream request failed");
            return Err(err);
        }

        let body = if status == StatusCode::NO_CONTENT {
            JsonValue::Null
        } else {
            response
                .json::<JsonValue>()
                .await
                .map_err(|e| UpstreamError::from_reqwest(e, timeout))?
        };

        Ok(UpstreamResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn retry_after_secs(headers: &header::HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Elapsed time as whole milliseconds, for status reports.
pub fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
