//! CLI runner for common setup.
//!
//! Loads the configuration file and initializes logging for the commands
//! that talk to the simulation.

use std::path::{Path, PathBuf};

use tracing::info;
use tsw_weather::app::AppConfig;
use tsw_weather::config::{config_file_path, ConfigFile, KeyLocator};
use tsw_weather::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Load config (defaults when the file is missing) and initialize logging.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config_path = resolve_config_path(config_path);
        let config = ConfigFile::load_from(&config_path)?;

        let logging_guard = init_logging(&default_log_dir(), default_log_file(), &config.logging.level)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    /// Build the application config, discovering API keys on disk.
    pub fn app_config(&self) -> AppConfig {
        AppConfig::from_config_file(&self.config, &KeyLocator::from_environment())
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("TSW Weather v{}", tsw_weather::VERSION);
        info!(
            config = %self.config_path.display(),
            "TSW Weather CLI: {} command", command
        );
    }
}

/// The `--config` path, or the default location.
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_path_prefers_argument() {
        let path = Path::new("/tmp/custom.ini");
        assert_eq!(resolve_config_path(Some(path)), PathBuf::from("/tmp/custom.ini"));
    }

    #[test]
    fn test_resolve_config_path_default() {
        assert_eq!(resolve_config_path(None), config_file_path());
    }
}
