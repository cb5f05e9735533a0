//! Position-driven weather synchronization.
//!
//! The [`SyncController`] polls the simulation for the player's position,
//! accumulates travelled distance, and refreshes the weather when the
//! accumulated distance crosses the configured threshold.
//!
//! ```text
//! tick ──► read_position ──► distance(last, new) ──► accumulate
//!                                                       │
//!                                   threshold reached ──┤
//!                                                       ▼
//!            fetch_current ──► convert ──► TransitionEngine::retarget
//! ```
//!
//! [`SyncConfig`] is the only configuration the core consumes. It is built by
//! the caller (see [`crate::config::ConfigFile::sync_config`]); nothing in
//! this module reads files or the environment.

mod admission;
mod controller;
mod error;

pub use admission::{DisplacementAccumulator, MIN_MOVEMENT_METERS};
pub use controller::{ControllerState, SyncController, TickOutcome};
pub use error::SyncError;

use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::weather::ConversionConstants;

/// Default distance between weather refreshes.
pub const DEFAULT_UPDATE_THRESHOLD_KM: f64 = 10.0;

/// Default position polling interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Default weather transition duration.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_secs(30);

/// Default number of consecutive failed reads before giving up.
pub const DEFAULT_FAILED_UPDATE_ATTEMPTS: u32 = 4;

/// Settings for the synchronization core.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Accumulated distance that admits a weather fetch.
    pub update_threshold_km: f64,
    /// Time between position reads.
    pub tick_interval: Duration,
    /// Duration of each weather transition.
    pub transition_duration: Duration,
    /// Consecutive failed reads before the run loop stops (0 = never).
    pub failed_update_attempts: u32,
    /// Retry policy for every outbound request.
    pub retry: RetryPolicy,
    /// Converter tuning.
    pub conversion: ConversionConstants,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            update_threshold_km: DEFAULT_UPDATE_THRESHOLD_KM,
            tick_interval: DEFAULT_TICK_INTERVAL,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            failed_update_attempts: DEFAULT_FAILED_UPDATE_ATTEMPTS,
            retry: RetryPolicy::default(),
            conversion: ConversionConstants::default(),
        }
    }
}
