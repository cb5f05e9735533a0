//! Application error types.

use std::fmt;

use crate::config::ConfigFileError;
use crate::feed::IdentityError;
use crate::http::RequestError;
use crate::sync::SyncError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Configuration error.
    Config(String),

    /// Failed to build an HTTP client.
    ClientCreation(RequestError),

    /// The simulation did not answer the availability probe as expected.
    SimulationUnavailable(IdentityError),

    /// The synchronization loop failed.
    Sync(SyncError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
            AppError::ClientCreation(e) => {
                write!(f, "Failed to create HTTP client: {}", e)
            }
            AppError::SimulationUnavailable(e) => {
                write!(
                    f,
                    "Train Sim World API isn't accessible ({}); check the game is running with -HTTPAPI",
                    e
                )
            }
            AppError::Sync(e) => {
                write!(f, "Weather sync failed: {}", e)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::ClientCreation(e) => Some(e),
            AppError::SimulationUnavailable(e) => Some(e),
            AppError::Sync(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        AppError::Sync(e)
    }
}

impl From<ConfigFileError> for AppError {
    fn from(e: ConfigFileError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        AppError::ClientCreation(e)
    }
}
