//! TSW Weather - Real-world weather for Train Sim World
//!
//! This library follows the player's position through the simulation's local
//! API, fetches the current weather from OpenWeather when the train has
//! travelled far enough, and fades the simulation's weather towards it.
//!
//! # High-Level API
//!
//! The [`app`] module wires everything together:
//!
//! ```ignore
//! use tsw_weather::app::{AppConfig, WeatherSyncApp};
//! use tsw_weather::config::{ConfigFile, KeyLocator};
//!
//! let file = ConfigFile::load()?;
//! let config = AppConfig::from_config_file(&file, &KeyLocator::from_environment());
//!
//! let mut app = WeatherSyncApp::start(config, &shutdown).await?;
//! app.run(&shutdown).await?;
//! app.shutdown().await?;
//! ```

pub mod app;
pub mod config;
pub mod feed;
pub mod geo;
pub mod http;
pub mod logging;
pub mod provider;
pub mod retry;
pub mod sync;
pub mod weather;

/// Version of the library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
