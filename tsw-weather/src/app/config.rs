//! Application configuration for [`WeatherSyncApp`](super::WeatherSyncApp).
//!
//! `AppConfig` combines everything needed to bootstrap the application: the
//! synchronization settings, both endpoints, and the resolved API keys.

use std::time::Duration;

use crate::config::{ApiKeys, ConfigFile, KeyLocator};
use crate::feed::DEFAULT_FEED_URL;
use crate::provider::DEFAULT_PROVIDER_URL;
use crate::sync::SyncConfig;

/// Address and timeout of one remote API.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointConfig {
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

/// Application configuration combining all component configs.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Settings for the synchronization core.
    pub sync: SyncConfig,

    /// Train Sim World external interface.
    pub simulation: EndpointConfig,

    /// OpenWeather API.
    pub provider: EndpointConfig,

    /// Resolved API keys.
    pub keys: ApiKeys,
}

impl AppConfig {
    /// Create a config with default settings and the given keys.
    pub fn new(keys: ApiKeys) -> Self {
        Self::from_parts(&ConfigFile::default(), keys)
    }

    /// Create application config from the configuration file.
    ///
    /// API keys missing from the file are looked up with `locator`.
    pub fn from_config_file(config: &ConfigFile, locator: &KeyLocator) -> Self {
        Self::from_parts(config, locator.resolve(&config.api_keys))
    }

    fn from_parts(config: &ConfigFile, keys: ApiKeys) -> Self {
        Self {
            sync: config.sync_config(),
            simulation: EndpointConfig::new(
                config.simulation.base_url.clone(),
                config.simulation_timeout(),
            ),
            provider: EndpointConfig::new(config.provider.base_url.clone(), config.provider_timeout()),
            keys,
        }
    }

    /// Provider key, or empty when none was found.
    pub fn provider_key(&self) -> &str {
        self.keys.provider.as_deref().unwrap_or("")
    }

    /// Simulation comm key, or empty when none was found.
    pub fn simulation_key(&self) -> &str {
        self.keys.simulation.as_deref().unwrap_or("")
    }

    /// Human-readable names of the keys that could not be found.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.keys.simulation.is_none() {
            missing.push("Train Sim World comm key");
        }
        if self.keys.provider.is_none() {
            missing.push("OpenWeather API key");
        }
        missing
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            simulation: EndpointConfig::new(
                DEFAULT_FEED_URL,
                Duration::from_secs(crate::config::DEFAULT_SIMULATION_TIMEOUT_SECS),
            ),
            provider: EndpointConfig::new(
                DEFAULT_PROVIDER_URL,
                Duration::from_secs(crate::config::DEFAULT_PROVIDER_TIMEOUT_SECS),
            ),
            keys: ApiKeys::default(),
        }
    }
}
