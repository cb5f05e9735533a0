//! Synchronization controller.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::feed::SimulationFeed;
use crate::geo::GeoPoint;
use crate::provider::WeatherSource;
use crate::weather::{TransitionEngine, WeatherConverter, WeatherVector};

use super::admission::DisplacementAccumulator;
use super::error::SyncError;
use super::SyncConfig;

/// Lifecycle of a [`SyncController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Created, subscription not yet registered.
    Uninitialized,
    /// Registered and polling.
    Running,
    /// Shut down; the subscription has been released.
    Stopped,
}

/// Result of one polling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The simulation has no position yet; nothing changed.
    NoPosition,
    /// Reading the position failed after retries.
    ReadFailed,
    /// Position tracked; threshold not reached.
    Tracked { accumulated_km: f64 },
    /// Threshold reached (or first position) and a refresh was attempted.
    Refreshed {
        position: GeoPoint,
        target: Option<WeatherVector>,
    },
}

/// Drives weather updates from the player's movement.
///
/// Ticks run sequentially (`&mut self`); the only concurrent activity is the
/// transition engine's push task.
pub struct SyncController<F: SimulationFeed + 'static, W: WeatherSource> {
    feed: Arc<F>,
    source: W,
    converter: WeatherConverter,
    engine: TransitionEngine<F>,
    accumulator: DisplacementAccumulator,
    last_position: Option<GeoPoint>,
    state: ControllerState,
    tick_interval: Duration,
    failure_limit: u32,
    consecutive_failures: u32,
}

impl<F: SimulationFeed + 'static, W: WeatherSource> SyncController<F, W> {
    pub fn new(feed: Arc<F>, source: W, config: &SyncConfig) -> Self {
        info!(
            threshold_km = config.update_threshold_km,
            "Weather controller initialized"
        );
        Self {
            engine: TransitionEngine::new(Arc::clone(&feed), config.transition_duration),
            feed,
            source,
            converter: WeatherConverter::new(config.conversion),
            accumulator: DisplacementAccumulator::new(config.update_threshold_km),
            last_position: None,
            state: ControllerState::Uninitialized,
            tick_interval: config.tick_interval.max(Duration::from_millis(1)),
            failure_limit: config.failed_update_attempts,
            consecutive_failures: 0,
        }
    }

    /// Replace the transition engine (e.g. to change its push cadence).
    pub fn with_engine(mut self, engine: TransitionEngine<F>) -> Self {
        self.engine = engine;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Distance travelled since the last weather refresh.
    pub fn accumulated_km(&self) -> f64 {
        self.accumulator.total_km()
    }

    pub fn last_position(&self) -> Option<GeoPoint> {
        self.last_position
    }

    pub fn engine(&self) -> &TransitionEngine<F> {
        &self.engine
    }

    /// Register the subscription and bootstrap weather for the first position.
    ///
    /// A registration failure is returned. A missing initial position is not
    /// an error; the first position read by [`tick`](Self::tick) bootstraps
    /// instead.
    pub async fn initialise(&mut self) -> Result<(), SyncError> {
        if self.state != ControllerState::Uninitialized {
            return Ok(());
        }

        self.feed.register_subscription().await?;

        match self.feed.read_position().await {
            Ok(position) => {
                self.last_position = Some(position);
                if let Err(e) = self.refresh(position).await {
                    warn!(error = %e, "Initial weather update failed");
                }
            }
            Err(e) if e.is_no_data() => {
                info!("No initial player position yet; waiting for the simulation");
            }
            Err(e) => {
                warn!(error = %e, "Could not read initial player position");
            }
        }

        self.state = ControllerState::Running;
        Ok(())
    }

    /// Read the position once and refresh weather if the threshold is reached.
    ///
    /// Never fails: every collaborator error is logged and reported through
    /// the outcome, so one bad tick cannot stop the polling loop.
    pub async fn tick(&mut self) -> TickOutcome {
        let position = match self.feed.read_position().await {
            Ok(position) => {
                self.consecutive_failures = 0;
                position
            }
            Err(e) if e.is_no_data() => {
                self.consecutive_failures = 0;
                debug!(reason = %e, "Could not retrieve player location, skipping update");
                return TickOutcome::NoPosition;
            }
            Err(e) if e.is_cancelled() => {
                debug!("Position read cancelled");
                return TickOutcome::NoPosition;
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    error = %e,
                    consecutive_failures = self.consecutive_failures,
                    "Failed to read player location"
                );
                return TickOutcome::ReadFailed;
            }
        };

        let Some(previous) = self.last_position.replace(position) else {
            info!(%position, "First player position, updating weather");
            let target = self.refresh_logged(position).await;
            return TickOutcome::Refreshed { position, target };
        };

        let delta_m = previous.distance_to(&position);
        match self.accumulator.record(delta_m) {
            Some(total_km) => {
                info!(
                    accumulated_km = total_km,
                    threshold_km = self.accumulator.threshold_km(),
                    "Distance threshold reached, updating weather"
                );
                let target = self.refresh_logged(position).await;
                TickOutcome::Refreshed { position, target }
            }
            None => {
                debug!(
                    delta_m,
                    accumulated_km = self.accumulator.total_km(),
                    "Player moved"
                );
                TickOutcome::Tracked {
                    accumulated_km: self.accumulator.total_km(),
                }
            }
        }
    }

    /// Refresh weather now, ignoring the threshold.
    ///
    /// Uses a fresh position when one can be read, otherwise the last known
    /// one. The accumulator is reset either way.
    pub async fn force_update(&mut self) -> Result<WeatherVector, SyncError> {
        info!("Forcing weather update");

        if let Ok(position) = self.feed.read_position().await {
            self.last_position = Some(position);
        }
        let position = self.last_position.ok_or(SyncError::NoPosition)?;

        self.accumulator.reset();
        self.refresh(position).await
    }

    /// Tick every interval until `shutdown` fires.
    ///
    /// Initialises first if needed. Returns [`SyncError::FeedLost`] when the
    /// configured number of consecutive reads fail.
    pub async fn run(&mut self, shutdown: &CancellationToken) -> Result<(), SyncError> {
        self.initialise().await?;

        info!(
            interval_secs = self.tick_interval.as_secs_f64(),
            "Starting weather update loop"
        );

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                outcome = self.tick() => outcome,
            };

            if outcome == TickOutcome::ReadFailed
                && self.failure_limit > 0
                && self.consecutive_failures >= self.failure_limit
            {
                error!(
                    consecutive_failures = self.consecutive_failures,
                    "Too many failed updates, stopping"
                );
                return Err(SyncError::FeedLost {
                    consecutive_failures: self.consecutive_failures,
                });
            }
        }

        info!("Shutdown requested");
        Ok(())
    }

    /// Stop any transition and release the subscription.
    ///
    /// The controller only counts as stopped once the subscription is
    /// released, so a failed deregistration can be retried.
    pub async fn shutdown(&mut self) -> Result<(), SyncError> {
        if self.state == ControllerState::Stopped {
            return Ok(());
        }
        info!("Performing cleanup");

        self.engine.stop().await;
        self.feed.deregister_subscription().await?;
        self.state = ControllerState::Stopped;
        Ok(())
    }

    async fn refresh(&mut self, position: GeoPoint) -> Result<WeatherVector, SyncError> {
        info!(%position, "Fetching weather data");
        let observation = self.source.fetch_current(position).await?;
        let target = self.converter.convert(&observation);
        info!(observation = %observation, target = %target, "Weather updated");

        self.engine.retarget(target).await;
        Ok(target)
    }

    async fn refresh_logged(&mut self, position: GeoPoint) -> Option<WeatherVector> {
        match self.refresh(position).await {
            Ok(target) => Some(target),
            Err(e) => {
                warn!(error = %e, "Failed to update weather");
                None
            }
        }
    }
}
