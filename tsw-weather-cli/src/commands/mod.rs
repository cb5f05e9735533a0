//! CLI command implementations.
//!
//! - [`check`] - Probe the simulation API
//! - [`init`] - Configuration initialization
//! - [`run`] - Main command (sync weather until Ctrl+C)

pub mod check;
pub mod init;
pub mod run;

use crate::error::CliError;

/// Build the multi-threaded runtime the async commands run on.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}
