//! Single-attempt request errors.

use thiserror::Error;

/// Errors from a single outbound HTTP attempt.
///
/// URLs are recorded without their query string, which may carry credentials.
/// All variants are considered transient by the retry executor: transport
/// failures, non-success statuses and undecodable bodies are retried alike.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Connection, timeout or other transport-level failure.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status. `url` has no query.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl RequestError {
    /// Build a decode error from a serde_json failure.
    pub fn decode(e: serde_json::Error) -> Self {
        RequestError::Decode(e.to_string())
    }
}

/// `url` without its query string or fragment.
pub(crate) fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_decode() {
            RequestError::Decode(e.to_string())
        } else {
            RequestError::Transport(e.to_string())
        }
    }
}
