//! Simulation feed errors.

use thiserror::Error;

use crate::http::RequestError;
use crate::retry::RetryError;

/// Errors from feed operations.
///
/// [`FeedError::NotRegistered`] and [`FeedError::NoData`] are expected steady
/// states (the simulation is loading, or the subscription has not been set up
/// yet). Only [`FeedError::Request`] indicates a real communication failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// No active subscription to read from.
    #[error("No active subscription")]
    NotRegistered,

    /// The feed has no valid position entry yet.
    #[error("Feed has no position data yet")]
    NoData,

    /// The request failed after retries, or was cancelled.
    #[error("Simulation request failed: {0}")]
    Request(#[from] RetryError<RequestError>),
}

impl FeedError {
    /// Returns true for the expected "nothing to read yet" conditions.
    pub fn is_no_data(&self) -> bool {
        matches!(self, FeedError::NotRegistered | FeedError::NoData)
    }

    /// Returns true if the request was abandoned because of shutdown.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FeedError::Request(e) if e.is_cancelled())
    }
}

/// Reasons the availability probe rejected the service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentityError {
    /// The info endpoint could not be reached or decoded.
    #[error("Simulation API not reachable: {0}")]
    Unreachable(RequestError),

    /// A metadata field did not have the expected value.
    #[error("Unexpected {field}: expected '{expected}', got '{actual}'")]
    Mismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// A metadata field was absent, empty or not positive.
    #[error("Invalid or missing {0}")]
    Missing(&'static str),
}
