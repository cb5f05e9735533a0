//! Application bootstrap and lifecycle management.
//!
//! [`WeatherSyncApp`] owns the startup sequence and the graceful shutdown of
//! the weather sync.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       WeatherSyncApp                          │
//! │                                                               │
//! │  1. FeedClient ────────► probe_identity (GET /info)           │
//! │  2. OpenWeatherClient                                         │
//! │  3. SyncController ────► register, bootstrap weather          │
//! │     └── TransitionEngine (background push task)               │
//! │  4. run(shutdown) ─────► tick every interval                  │
//! │  5. shutdown ──────────► stop transition, deregister          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{LiveApp, WeatherSyncApp};
pub use config::{AppConfig, EndpointConfig};
pub use error::AppError;
