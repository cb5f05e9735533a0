//! HTTP implementation of [`SimulationFeed`].

use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{FeedError, IdentityError};
use super::model::{ApiInfo, ApiMeta, SubscriptionData};
use super::subscription::SubscriptionHandle;
use super::SimulationFeed;
use crate::geo::GeoPoint;
use crate::http::{AsyncHttpClient, ReqwestClient, RequestError};
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::weather::WeatherVector;

/// Default address of the simulation's communication API.
pub const DEFAULT_FEED_URL: &str = "http://127.0.0.1:31270";

/// Worker name the simulation reports on `/info`.
pub const EXPECTED_WORKER: &str = "DTGCommWorkerRC";

/// Game name the simulation reports on `/info`.
pub const EXPECTED_GAME_NAME: &str = "Train Sim World 6®";

/// Header carrying the communication API key.
const COMM_KEY_HEADER: &str = "DTGCommKey";

/// Subscribed data path for player position.
const PLAYER_INFO_PATH: &str = "DriverAid.PlayerInfo";

/// Identity the availability probe accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedIdentity {
    pub worker: String,
    pub game_name: String,
}

impl Default for ExpectedIdentity {
    fn default() -> Self {
        Self {
            worker: EXPECTED_WORKER.to_string(),
            game_name: EXPECTED_GAME_NAME.to_string(),
        }
    }
}

impl ExpectedIdentity {
    /// Check reported metadata against this identity.
    pub fn validate(&self, meta: &ApiMeta) -> Result<(), IdentityError> {
        if meta.worker != self.worker {
            return Err(IdentityError::Mismatch {
                field: "Worker",
                expected: self.worker.clone(),
                actual: meta.worker.clone(),
            });
        }
        if meta.game_name != self.game_name {
            return Err(IdentityError::Mismatch {
                field: "GameName",
                expected: self.game_name.clone(),
                actual: meta.game_name.clone(),
            });
        }
        if meta.game_build_number <= 0 {
            return Err(IdentityError::Missing("GameBuildNumber"));
        }
        if meta.api_version <= 0 {
            return Err(IdentityError::Missing("APIVersion"));
        }
        if meta.game_instance_id.is_empty() {
            return Err(IdentityError::Missing("GameInstanceID"));
        }
        Ok(())
    }
}

/// Client for the simulation's communication API.
///
/// Holds exactly one [`SubscriptionHandle`]. Each kind of operation is
/// serialized by its own gate, so a client never has two reads (or two
/// pushes, or two subscription changes) in flight at once, while reads and
/// pushes may overlap.
pub struct FeedClient<H: AsyncHttpClient> {
    http: H,
    base_url: String,
    executor: RetryExecutor,
    shutdown: CancellationToken,
    expected: ExpectedIdentity,
    handle: Mutex<Option<SubscriptionHandle>>,
    subscription_gate: tokio::sync::Mutex<()>,
    read_gate: tokio::sync::Mutex<()>,
    push_gate: tokio::sync::Mutex<()>,
}

impl FeedClient<ReqwestClient> {
    /// Build a client over reqwest that authenticates with `comm_key`.
    pub fn connect(
        base_url: &str,
        comm_key: &str,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self, RequestError> {
        let http = ReqwestClient::with_headers(
            timeout,
            &[(COMM_KEY_HEADER, comm_key), ("Accept", "application/json")],
        )?;
        Ok(Self::new(http, base_url, policy))
    }
}

impl<H: AsyncHttpClient> FeedClient<H> {
    /// Create a client over an arbitrary HTTP transport.
    pub fn new(http: H, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            executor: RetryExecutor::new("simulation", policy),
            shutdown: CancellationToken::new(),
            expected: ExpectedIdentity::default(),
            handle: Mutex::new(None),
            subscription_gate: tokio::sync::Mutex::new(()),
            read_gate: tokio::sync::Mutex::new(()),
            push_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Override the identity accepted by the availability probe.
    pub fn with_expected_identity(mut self, expected: ExpectedIdentity) -> Self {
        self.expected = expected;
        self
    }

    /// Abandon retries as soon as `shutdown` is cancelled.
    ///
    /// Deregistration ignores the token so the subscription can still be
    /// released while shutting down.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Current subscription handle, if one has been created.
    pub fn handle(&self) -> Option<SubscriptionHandle> {
        *self.handle.lock()
    }

    /// Returns true if a subscription is registered and active.
    pub fn is_registered(&self) -> bool {
        self.handle().is_some_and(|h| h.active)
    }

    /// Fetch `/info` once and validate the reported identity.
    ///
    /// Independent of subscription state. Not retried: a failed probe means
    /// the simulation is not available yet.
    pub async fn probe_identity(&self) -> Result<ApiMeta, IdentityError> {
        let url = format!("{}/info", self.base_url);
        let body = self
            .http
            .get(&url)
            .await
            .map_err(IdentityError::Unreachable)?;
        let info: ApiInfo = decode(&body).map_err(IdentityError::Unreachable)?;
        let meta = info.meta.ok_or(IdentityError::Missing("Meta"))?;

        self.expected.validate(&meta)?;

        info!(
            instance_id = %meta.game_instance_id,
            build = meta.game_build_number,
            api_version = meta.api_version,
            "Connected to simulation API"
        );
        Ok(meta)
    }

    /// Returns true if the simulation answers with the expected identity.
    pub async fn is_available(&self) -> bool {
        match self.probe_identity().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Simulation API not available yet");
                false
            }
        }
    }

    fn active_id(&self) -> Option<u16> {
        self.handle.lock().filter(|h| h.active).map(|h| h.id)
    }
}

impl<H: AsyncHttpClient> SimulationFeed for FeedClient<H> {
    async fn register_subscription(&self) -> Result<u16, FeedError> {
        let _gate = self.subscription_gate.lock().await;

        let id = self
            .handle
            .lock()
            .get_or_insert_with(SubscriptionHandle::generate)
            .id;

        let url = format!(
            "{}/subscription/{}?Subscription={}",
            self.base_url, PLAYER_INFO_PATH, id
        );
        let http = &self.http;
        let url = url.as_str();

        if let Err(e) = self
            .executor
            .execute_cancellable(move || http.post(url), &self.shutdown)
            .await
        {
            warn!(subscription_id = id, error = %e, "Failed to register subscription");
            return Err(e.into());
        }

        if let Some(handle) = self.handle.lock().as_mut() {
            handle.active = true;
        }
        info!(subscription_id = id, "Subscription registered");
        Ok(id)
    }

    async fn read_position(&self) -> Result<GeoPoint, FeedError> {
        let _gate = self.read_gate.lock().await;

        let id = self.active_id().ok_or(FeedError::NotRegistered)?;
        let url = format!("{}/subscription?Subscription={}", self.base_url, id);
        let http = &self.http;
        let url = url.as_str();

        let data: SubscriptionData = self
            .executor
            .execute_cancellable(
                move || async move {
                    let body = http.get(url).await?;
                    decode(&body)
                },
                &self.shutdown,
            )
            .await?;

        let position = data.position().ok_or(FeedError::NoData)?;
        debug!(%position, "Player location");
        Ok(position)
    }

    async fn push_weather(&self, weather: &WeatherVector) -> Result<(), FeedError> {
        let _gate = self.push_gate.lock().await;

        for (channel, value) in weather.channels() {
            let url = format!("{}/set/WeatherManager.{}", self.base_url, channel);
            let body = serde_json::json!({ "Value": value }).to_string();
            let http = &self.http;
            let (url, body) = (url.as_str(), body.as_str());

            if let Err(e) = self
                .executor
                .execute_cancellable(move || http.patch_json(url, body), &self.shutdown)
                .await
            {
                warn!(channel, error = %e, "Failed to push weather channel");
                return Err(e.into());
            }
        }

        debug!(%weather, "Weather pushed");
        Ok(())
    }

    async fn deregister_subscription(&self) -> Result<(), FeedError> {
        let _gate = self.subscription_gate.lock().await;

        let Some(handle) = self.handle() else {
            warn!("No subscription to deregister");
            return Ok(());
        };

        let url = format!("{}/subscription/?Subscription={}", self.base_url, handle.id);
        let http = &self.http;
        let url = url.as_str();

        if let Err(e) = self.executor.execute(move || http.delete(url)).await {
            warn!(subscription_id = handle.id, error = %e, "Failed to deregister subscription");
            return Err(e.into());
        }

        *self.handle.lock() = None;
        info!(subscription_id = handle.id, "Subscription deregistered");
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RequestError> {
    serde_json::from_slice(body).map_err(RequestError::decode)
}
