//! Shared state handed to every tool call.

use std::sync::Arc;
use std::time::Instant;

use crate::client::OpenStatesClient;
use crate::config::Settings;
use crate::error::Result;

/// Everything a tool handler needs: settings, the pooled client, and the
/// process start time. Built once in `main` and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ToolContext {
    settings: Arc<Settings>,
    client: OpenStatesClient,
    started_at: Instant,
}

impl ToolContext {
    /// Build the context, including the HTTP client.
    pub fn new(settings: Settings) -> Result<Self> {
        let settings = Arc::new(settings);
        let client = OpenStatesClient::new(Arc::clone(&settings))?;
        Ok(Self {
            settings,
            client,
            started_at: Instant::now(),
        })
    }

    /// Immutable process settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The shared upstream client.
    pub fn client(&self) -> &OpenStatesClient {
        &self.client
    }

    /// When the context was created.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}
