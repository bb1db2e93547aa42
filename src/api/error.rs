use thiserror::Error;

/// A failed read against the run API.
///
/// Every variant is the dashboard's "fetch failed" condition; the variants
/// only differ in what went wrong on the way.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request failed: {status}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid API URL {url}: {reason}")]
    Url { url: String, reason: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. }
            | FetchError::Url { url, .. } => url,
        }
    }

    /// HTTP status for non-success responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
