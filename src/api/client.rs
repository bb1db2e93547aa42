//! Blocking HTTP client for the run API.
//!
//! All calls are idempotent reads; the dashboard never writes.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::error::{FetchError, FetchResult};
use crate::models::{RowPage, Run, RunSummary};

pub(crate) const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
pub(crate) const USER_AGENT: &str = concat!("ninout-dash/", env!("CARGO_PKG_VERSION"));

/// Window of rows requested from `/rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub limit: u64,
    pub offset: u64,
}

impl RowWindow {
    /// The fixed window the dashboard always shows.
    pub const FIRST_PAGE: RowWindow = RowWindow {
        limit: 100,
        offset: 0,
    };
}

impl Default for RowWindow {
    fn default() -> Self {
        Self::FIRST_PAGE
    }
}

/// Read access to run snapshots.
pub trait RunSource {
    /// `GET /api/runs`
    fn list_runs(&self) -> FetchResult<Vec<RunSummary>>;

    /// `GET /api/runs/{run_name}`
    fn get_run(&self, run_name: &str) -> FetchResult<Run>;

    /// `GET /api/runs/{run_name}/steps/{step_name}/rows?limit=&offset=`
    fn get_step_rows(
        &self,
        run_name: &str,
        step_name: &str,
        window: RowWindow,
    ) -> FetchResult<RowPage>;
}

/// [`RunSource`] backed by the HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// `request_timeout` bounds the whole request (connect + transfer).
    pub fn new(base_url: &str, request_timeout: Duration) -> FetchResult<Self> {
        let base = Url::parse(base_url).map_err(|e| FetchError::Url {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(FetchError::Url {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS).min(request_timeout))
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `{base}/api/{segments...}`, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        let url_text = url.to_string();
        tracing::debug!(url = %url_text, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url_text.clone(),
                source,
            })?;

        let response = validate_response_status(response, &url_text)?;

        response.json::<T>().map_err(|source| FetchError::Decode {
            url: url_text,
            source,
        })
    }
}

/// Turn non-success statuses into [`FetchError::Status`].
fn validate_response_status(response: Response, url: &str) -> FetchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    tracing::debug!(url, status = status.as_u16(), "non-success response");
    Err(FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown error").to_string(),
    })
}

impl RunSource for ApiClient {
    fn list_runs(&self) -> FetchResult<Vec<RunSummary>> {
        self.get_json(self.endpoint(&["runs"]))
    }

    fn get_run(&self, run_name: &str) -> FetchResult<Run> {
        self.get_json(self.endpoint(&["runs", run_name]))
    }

    fn get_step_rows(
        &self,
        run_name: &str,
        step_name: &str,
        window: RowWindow,
    ) -> FetchResult<RowPage> {
        let mut url = self.endpoint(&["runs", run_name, "steps", step_name, "rows"]);
        url.query_pairs_mut()
            .append_pair("limit", &window.limit.to_string())
            .append_pair("offset", &window.offset.to_string());
        self.get_json(url)
    }
}
