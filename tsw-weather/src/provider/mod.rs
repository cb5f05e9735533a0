//! Weather provider client.
//!
//! Fetches the current observation for a coordinate from OpenWeather. There
//! is no caching: every call is a fresh request, and the synchronization
//! controller decides how often to ask.

mod client;
mod model;

pub use client::{OpenWeatherClient, ProviderError, DEFAULT_PROVIDER_URL};
pub use model::{
    Condition, Precipitation, ProviderObservation, Wind, DEFAULT_TEMPERATURE_KELVIN,
    SNOW_CONDITION_CODES,
};

use std::future::Future;

use crate::geo::GeoPoint;

/// Source of current weather observations.
pub trait WeatherSource: Send + Sync {
    /// Fetch the current observation at `point`.
    fn fetch_current(
        &self,
        point: GeoPoint,
    ) -> impl Future<Output = Result<ProviderObservation, ProviderError>> + Send;
}
