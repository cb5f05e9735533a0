//! Synchronization errors.

use thiserror::Error;

use crate::feed::FeedError;
use crate::provider::ProviderError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No position has been read yet.
    #[error("Player position unknown")]
    NoPosition,

    /// Too many consecutive failed position reads.
    #[error("Lost contact with the simulation after {consecutive_failures} failed updates")]
    FeedLost { consecutive_failures: u32 },
}
