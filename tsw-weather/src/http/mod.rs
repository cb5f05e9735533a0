//! HTTP client abstraction for testability
//!
//! Both outbound services (the local simulation feed and the remote weather
//! provider) talk through [`AsyncHttpClient`], so tests can substitute a
//! scripted client and never touch the network.

mod error;

pub use error::RequestError;

use error::strip_query;

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tracing::trace;

/// Connect timeout applied to every client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for asynchronous HTTP client operations.
///
/// Every method resolves to the response body on a 2xx status and to
/// [`RequestError::Status`] otherwise.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, RequestError>> + Send;

    /// Performs an HTTP POST request with an empty body.
    fn post(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, RequestError>> + Send;

    /// Performs an HTTP DELETE request.
    fn delete(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, RequestError>> + Send;

    /// Performs an HTTP PATCH request with a JSON body.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `json_body` - JSON body as a string
    fn patch_json(
        &self,
        url: &str,
        json_body: &str,
    ) -> impl Future<Output = Result<Vec<u8>, RequestError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the given request timeout and no extra headers.
    pub fn new(timeout: Duration) -> Result<Self, RequestError> {
        Self::with_headers(timeout, &[])
    }

    /// Creates a client that sends `headers` with every request.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Per-request timeout
    /// * `headers` - Slice of (header_name, header_value) tuples
    pub fn with_headers(timeout: Duration, headers: &[(&str, &str)]) -> Result<Self, RequestError> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::Transport(format!("Invalid header name: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RequestError::Transport(format!("Invalid header value: {}", e)))?;
            default_headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .default_headers(default_headers)
            .build()
            .map_err(|e| RequestError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Vec<u8>, RequestError> {
        let response = request.send().await?;

        let status = response.status();
        let url = strip_query(url);
        trace!(url, status = status.as_u16(), "HTTP response");

        if !status.is_success() {
            return Err(RequestError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        self.execute(self.client.get(url), url).await
    }

    async fn post(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        self.execute(self.client.post(url), url).await
    }

    async fn delete(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        self.execute(self.client.delete(url), url).await
    }

    async fn patch_json(&self, url: &str, json_body: &str) -> Result<Vec<u8>, RequestError> {
        let request = self
            .client
            .patch(url)
            .header(CONTENT_TYPE, "application/json")
            .body(json_body.to_string());
        self.execute(request, url).await
    }
}
