//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use tsw_weather::app::AppError;
use tsw_weather::config::ConfigFileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to create the async runtime
    Runtime(std::io::Error),
    /// Application error
    App(AppError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::App(AppError::SimulationUnavailable(_)) => {
                eprintln!();
                eprintln!("Make sure:");
                eprintln!("  1. Train Sim World 6 is running");
                eprintln!("  2. The game was launched with the -HTTPAPI flag");
                eprintln!("  3. CommAPIKey.txt exists in Documents/My Games/TrainSimWorld6/Saved/Config");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'tsw-weather init' to write a default configuration file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to create async runtime: {}", e),
            CliError::App(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::App(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("weather.update_threshold_km".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: weather.update_threshold_km"
        );
    }

    #[test]
    fn test_from_config_file_error() {
        let err: CliError = ConfigFileError::WriteError("disk full".to_string()).into();
        assert!(matches!(err, CliError::Config(ref msg) if msg.contains("disk full")));
    }
}
