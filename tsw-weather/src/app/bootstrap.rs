//! Application bootstrap implementation.
//!
//! `WeatherSyncApp` sequences startup: build the clients, probe the
//! simulation, register the subscription and bootstrap the weather. It then
//! runs the tick loop until shutdown and releases the subscription.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::feed::{ApiMeta, FeedClient, SimulationFeed};
use crate::http::{AsyncHttpClient, ReqwestClient};
use crate::provider::{OpenWeatherClient, WeatherSource};
use crate::sync::{SyncConfig, SyncController};

/// The application wired to the real simulation and OpenWeather.
pub type LiveApp = WeatherSyncApp<FeedClient<ReqwestClient>, OpenWeatherClient<ReqwestClient>>;

/// Weather sync application with lifecycle management.
///
/// # Example
///
/// ```ignore
/// use tsw_weather::app::{AppConfig, WeatherSyncApp};
///
/// let mut app = WeatherSyncApp::start(config, &shutdown).await?;
/// app.run(&shutdown).await?;
/// app.shutdown().await?;
/// ```
pub struct WeatherSyncApp<F: SimulationFeed + 'static, W: WeatherSource> {
    controller: SyncController<F, W>,
    identity: Option<ApiMeta>,
}

impl LiveApp {
    /// Start the application against the configured endpoints.
    ///
    /// Both clients abandon their retries once `shutdown` is cancelled, so a
    /// shutdown request during startup is not held up by backoff.
    ///
    /// # Errors
    ///
    /// Fails when a client cannot be built, the simulation does not answer
    /// the probe, or the subscription cannot be registered.
    pub async fn start(config: AppConfig, shutdown: &CancellationToken) -> Result<Self, AppError> {
        for key in config.missing_keys() {
            warn!("No {} found", key);
        }

        let feed = Self::feed_client(&config)?.with_shutdown(shutdown.clone());
        let source = OpenWeatherClient::connect(
            &config.provider.base_url,
            config.provider_key(),
            config.provider.timeout,
            config.sync.retry.clone(),
        )?
        .with_shutdown(shutdown.clone());

        Self::start_with(feed, source, &config.sync).await
    }

    /// Probe the simulation once without registering anything.
    pub async fn probe(config: &AppConfig) -> Result<ApiMeta, AppError> {
        Self::feed_client(config)?
            .probe_identity()
            .await
            .map_err(AppError::SimulationUnavailable)
    }

    fn feed_client(config: &AppConfig) -> Result<FeedClient<ReqwestClient>, AppError> {
        Ok(FeedClient::connect(
            &config.simulation.base_url,
            config.simulation_key(),
            config.simulation.timeout,
            config.sync.retry.clone(),
        )?)
    }
}

impl<H, W> WeatherSyncApp<FeedClient<H>, W>
where
    H: AsyncHttpClient + 'static,
    W: WeatherSource,
{
    /// Probe `feed`, then initialise the controller.
    pub async fn start_with(
        feed: FeedClient<H>,
        source: W,
        sync: &SyncConfig,
    ) -> Result<Self, AppError> {
        info!("Starting weather sync");

        let identity = feed
            .probe_identity()
            .await
            .map_err(AppError::SimulationUnavailable)?;

        let mut app = Self::initialise(Arc::new(feed), source, sync).await?;
        app.identity = Some(identity);
        Ok(app)
    }
}

impl<F: SimulationFeed + 'static, W: WeatherSource> WeatherSyncApp<F, W> {
    /// Initialise a controller over an already-verified feed.
    pub async fn initialise(feed: Arc<F>, source: W, sync: &SyncConfig) -> Result<Self, AppError> {
        let mut controller = SyncController::new(feed, source, sync);
        controller.initialise().await?;
        info!("Weather sync initialized");

        Ok(Self {
            controller,
            identity: None,
        })
    }

    /// Identity reported by the simulation at startup, if it was probed.
    pub fn identity(&self) -> Option<&ApiMeta> {
        self.identity.as_ref()
    }

    pub fn controller(&self) -> &SyncController<F, W> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SyncController<F, W> {
        &mut self.controller
    }

    /// Run the tick loop until `shutdown` is cancelled.
    pub async fn run(&mut self, shutdown: &CancellationToken) -> Result<(), AppError> {
        self.controller.run(shutdown).await?;
        Ok(())
    }

    /// Stop any transition and deregister the subscription.
    pub async fn shutdown(mut self) -> Result<(), AppError> {
        info!("Shutting down weather sync");
        self.controller.shutdown().await?;
        info!("Weather sync shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::MockFeed;
    use crate::feed::IdentityError;
    use crate::geo::GeoPoint;
    use crate::http::tests::MockHttpClient;
    use crate::provider::tests::MockWeatherSource;
    use crate::provider::ProviderObservation;
    use crate::retry::RetryPolicy;
    use crate::sync::ControllerState;
    use std::time::Duration;

    const INFO: &str = r#"{"Meta": {
        "Worker": "DTGCommWorkerRC",
        "GameName": "Train Sim World 6®",
        "GameBuildNumber": 512,
        "APIVersion": 1,
        "GameInstanceID": "instance-1"
    }, "HttpRoutes": []}"#;

    const EMPTY_FEED: &str = r#"{"RequestedSubscriptionID": 7, "Entries": []}"#;

    fn sync_config() -> SyncConfig {
        SyncConfig {
            retry: RetryPolicy::none(),
            ..Default::default()
        }
    }

    fn source() -> MockWeatherSource {
        MockWeatherSource::new(ProviderObservation {
            temperature_kelvin: Some(288.15),
            ..Default::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_probes_then_registers() {
        let http = MockHttpClient::ok("");
        http.push(Ok(INFO.as_bytes().to_vec()));
        http.push(Ok(Vec::new()));
        http.push(Ok(EMPTY_FEED.as_bytes().to_vec()));
        let feed = FeedClient::new(http, "http://sim", RetryPolicy::none());

        let app = WeatherSyncApp::start_with(feed, source(), &sync_config())
            .await
            .unwrap();

        assert_eq!(
            app.identity().map(|m| m.game_instance_id.as_str()),
            Some("instance-1")
        );
        assert_eq!(app.controller().state(), ControllerState::Running);
        assert_eq!(app.controller().last_position(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fails_when_probe_fails() {
        let feed = FeedClient::new(MockHttpClient::failing(503), "http://sim", RetryPolicy::none());

        let result = WeatherSyncApp::start_with(feed, source(), &sync_config()).await;

        assert!(matches!(
            result,
            Err(AppError::SimulationUnavailable(IdentityError::Unreachable(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_cancelled_then_shutdown() {
        let feed = Arc::new(MockFeed::new());
        feed.set_position(Ok(GeoPoint::new(48.2, 16.37)));

        let mut app = WeatherSyncApp::initialise(Arc::clone(&feed), source(), &sync_config())
            .await
            .unwrap();
        assert!(app.identity().is_none());

        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(90)).await;
            trigger.cancel();
        });

        app.run(&shutdown).await.unwrap();
        app.shutdown().await.unwrap();

        assert!(!feed.is_registered());
        assert!(!feed.pushes().is_empty());
    }
}
