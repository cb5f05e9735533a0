//! OpenWeather current-weather client.

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::model::{CurrentWeatherResponse, ProviderObservation};
use super::WeatherSource;
use crate::geo::GeoPoint;
use crate::http::{AsyncHttpClient, ReqwestClient, RequestError};
use crate::retry::{RetryError, RetryExecutor, RetryPolicy};

/// Default OpenWeather API address.
pub const DEFAULT_PROVIDER_URL: &str = "https://api.openweathermap.org";

/// Errors from the weather provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// No API key was configured. No request is made.
    #[error("No OpenWeather API key configured")]
    MissingApiKey,

    /// The request failed after retries, or was cancelled.
    #[error("Weather request failed: {0}")]
    Request(#[from] RetryError<RequestError>),
}

/// Client for the OpenWeather current-weather endpoint.
pub struct OpenWeatherClient<H: AsyncHttpClient> {
    http: H,
    base_url: String,
    api_key: String,
    executor: RetryExecutor,
    shutdown: CancellationToken,
    gate: tokio::sync::Mutex<()>,
}

impl OpenWeatherClient<ReqwestClient> {
    /// Build a client over reqwest.
    pub fn connect(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self, RequestError> {
        let http = ReqwestClient::new(timeout)?;
        Ok(Self::new(http, base_url, api_key, policy))
    }
}

impl<H: AsyncHttpClient> OpenWeatherClient<H> {
    pub fn new(http: H, base_url: &str, api_key: &str, policy: RetryPolicy) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            executor: RetryExecutor::new("openweather", policy),
            shutdown: CancellationToken::new(),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Abandon retries as soon as `shutdown` is cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Returns true if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl<H: AsyncHttpClient> WeatherSource for OpenWeatherClient<H> {
    async fn fetch_current(&self, point: GeoPoint) -> Result<ProviderObservation, ProviderError> {
        if !self.has_api_key() {
            return Err(ProviderError::MissingApiKey);
        }

        let _gate = self.gate.lock().await;

        let url = format!(
            "{}/data/2.5/weather?lat={}&lon={}&appid={}",
            self.base_url, point.latitude, point.longitude, self.api_key
        );
        let http = &self.http;
        let url = url.as_str();

        debug!(%point, "Fetching weather data");
        let raw: CurrentWeatherResponse = self
            .executor
            .execute_cancellable(
                move || async move {
                    let body = http.get(url).await?;
                    serde_json::from_slice(&body).map_err(RequestError::decode)
                },
                &self.shutdown,
            )
            .await?;

        let observation = ProviderObservation::from(raw);
        info!(%point, observation = %observation, "Weather data received");
        Ok(observation)
    }
}
