//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::time::Duration;

use crate::feed::DEFAULT_FEED_URL;
use crate::provider::DEFAULT_PROVIDER_URL;
use crate::retry::{RetryPolicy, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_ATTEMPTS};
use crate::sync::{
    SyncConfig, DEFAULT_FAILED_UPDATE_ATTEMPTS, DEFAULT_TICK_INTERVAL,
    DEFAULT_TRANSITION_DURATION, DEFAULT_UPDATE_THRESHOLD_KM,
};
use crate::weather::ConversionConstants;

/// Default per-request timeout for the simulation API.
pub const DEFAULT_SIMULATION_TIMEOUT_SECS: u64 = 30;

/// Default per-request timeout for the weather provider.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub weather: WeatherSettings,
    pub update: UpdateSettings,
    pub retry: RetrySettings,
    pub simulation: SimulationSettings,
    pub provider: ProviderSettings,
    pub logging: LoggingSettings,
    pub api_keys: ApiKeySettings,
    pub conversion: ConversionConstants,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSettings {
    /// Distance in km before fetching new weather data
    pub update_threshold_km: f64,
    /// Duration of smooth weather transitions
    pub transition_duration_seconds: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            update_threshold_km: DEFAULT_UPDATE_THRESHOLD_KM,
            transition_duration_seconds: DEFAULT_TRANSITION_DURATION.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSettings {
    /// How often to read the player location
    pub location_check_interval_seconds: u64,
    /// Consecutive failed reads before giving up (0 = never)
    pub failed_update_attempts: u32,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            location_check_interval_seconds: DEFAULT_TICK_INTERVAL.as_secs(),
            failed_update_attempts: DEFAULT_FAILED_UPDATE_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            jitter: true,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.max_attempts)
            .with_initial_delay(Duration::from_millis(self.initial_delay_ms))
            .with_jitter(self.jitter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_URL.to_string(),
            timeout_secs: DEFAULT_SIMULATION_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// debug, info, warn or error
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// API keys set directly in the config file.
///
/// When absent, keys are discovered from well-known files (see
/// [`super::KeyLocator`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiKeySettings {
    pub openweather: Option<String>,
    pub simulation: Option<String>,
}

impl ConfigFile {
    /// Settings consumed by the synchronization core.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            update_threshold_km: self.weather.update_threshold_km,
            tick_interval: Duration::from_secs(self.update.location_check_interval_seconds),
            transition_duration: Duration::from_secs(self.weather.transition_duration_seconds),
            failed_update_attempts: self.update.failed_update_attempts,
            retry: self.retry.policy(),
            conversion: self.conversion,
        }
    }

    pub fn simulation_timeout(&self) -> Duration {
        Duration::from_secs(self.simulation.timeout_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.weather.update_threshold_km, 10.0);
        assert_eq!(config.weather.transition_duration_seconds, 30);
        assert_eq!(config.update.location_check_interval_seconds, 60);
        assert_eq!(config.update.failed_update_attempts, 4);
        assert_eq!(config.retry.max_attempts, 6);
        assert_eq!(config.simulation.base_url, "http://127.0.0.1:31270");
        assert_eq!(config.provider.base_url, "https://api.openweathermap.org");
        assert_eq!(config.logging.level, "info");
        assert!(config.api_keys.openweather.is_none());
    }

    #[test]
    fn test_sync_config_matches_core_defaults() {
        assert_eq!(ConfigFile::default().sync_config(), SyncConfig::default());
    }

    #[test]
    fn test_retry_policy_from_settings() {
        let settings = RetrySettings {
            max_attempts: 3,
            initial_delay_ms: 250,
            jitter: false,
        };
        let policy = settings.policy();
        assert_eq!(policy.attempts(), 3);
        assert_eq!(policy.base_delay(1), Duration::from_millis(500));
        assert!(!policy.jitter);
    }
}
