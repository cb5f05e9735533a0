//! User configuration.
//!
//! [`ConfigFile`] is loaded from `~/.tsw-weather/config.ini` (or a path given
//! on the command line) and turned into the typed settings the rest of the
//! crate consumes. API keys are discovered by [`KeyLocator`].
//!
//! # Example
//!
//! ```
//! use tsw_weather::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let sync = config.sync_config();
//! assert_eq!(sync.update_threshold_km, 10.0);
//! ```

mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use file::{
    config_directory, config_file_path, ConfigFileError, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};
pub use keys::{
    read_key_file, ApiKeys, KeyLocator, KeySource, PROVIDER_KEY_FILE, SIMULATION_KEY_FILE,
};
pub use settings::{
    ApiKeySettings, ConfigFile, LoggingSettings, ProviderSettings, RetrySettings,
    SimulationSettings, UpdateSettings, WeatherSettings, DEFAULT_LOG_LEVEL,
    DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_SIMULATION_TIMEOUT_SECS,
};

/// Mask an API key for display, keeping the first and last four characters.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("abcd1234efgh5678"), "abcd...5678");
        assert_eq!(mask_api_key("123456789"), "1234...6789");
    }

    #[test]
    fn test_mask_short_keys() {
        assert_eq!(mask_api_key(""), "****");
        assert_eq!(mask_api_key("12345678"), "****");
    }
}
