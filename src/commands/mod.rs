//! Subcommand implementations.

pub mod graph;
pub mod rows;
pub mod runs;
pub mod watch;

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::config::DashConfig;

/// Build the API client for a one-shot command.
pub(crate) fn client(config: &DashConfig) -> Result<ApiClient> {
    ApiClient::new(&config.api_url, config.request_timeout())
        .with_context(|| format!("Invalid API URL: {}", config.api_url))
}
