//! Provider observation model.
//!
//! The provider omits whole objects when they do not apply (no `rain` block
//! when it is dry, no `visibility` in some regions). Every such field is an
//! explicit `Option`, and the accessor methods on [`ProviderObservation`]
//! document what absence means.

use std::fmt;

use serde::Deserialize;

/// Temperature assumed when the provider reports none (0 °C).
pub const DEFAULT_TEMPERATURE_KELVIN: f64 = 273.15;

/// Condition codes in `[600, 700)` are the snow family.
pub const SNOW_CONDITION_CODES: std::ops::Range<u32> = 600..700;

/// Precipitation volume over the last one and three hours, in mm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Precipitation {
    #[serde(rename = "1h", default)]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h", default)]
    pub three_hours: Option<f64>,
}

/// Coarse weather condition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Condition {
    pub id: u32,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Condition {
    pub fn is_snow(&self) -> bool {
        SNOW_CONDITION_CODES.contains(&self.id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
    #[serde(default)]
    pub gust: Option<f64>,
}

/// One current-weather observation for a coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderObservation {
    pub temperature_kelvin: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub cloud_percent: Option<f64>,
    pub rain: Option<Precipitation>,
    pub snow: Option<Precipitation>,
    pub visibility_m: Option<f64>,
    pub condition: Option<Condition>,
    pub wind: Option<Wind>,
    pub location_name: Option<String>,
}

impl ProviderObservation {
    /// Temperature in Kelvin; absent means 273.15 K.
    pub fn temperature(&self) -> f64 {
        self.temperature_kelvin.unwrap_or(DEFAULT_TEMPERATURE_KELVIN)
    }

    /// Cloud cover percentage; absent means clear sky.
    pub fn clouds(&self) -> f64 {
        self.cloud_percent.unwrap_or(0.0)
    }

    /// Relative humidity percentage; absent means 0.
    pub fn humidity(&self) -> f64 {
        self.humidity_percent.unwrap_or(0.0)
    }

    /// Rain over the last hour in mm; absent means dry.
    pub fn rain_1h(&self) -> f64 {
        self.rain.and_then(|r| r.one_hour).unwrap_or(0.0)
    }

    /// Snow over the last hour in mm; absent means none.
    pub fn snow_1h(&self) -> f64 {
        self.snow.and_then(|s| s.one_hour).unwrap_or(0.0)
    }

    /// Returns true if the primary condition is in the snow family.
    ///
    /// An absent condition is not snow.
    pub fn is_snowing(&self) -> bool {
        self.condition.as_ref().is_some_and(Condition::is_snow)
    }
}

impl fmt::Display for ProviderObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self
            .condition
            .as_ref()
            .and_then(|c| c.main.as_deref())
            .unwrap_or("Unknown");
        write!(f, "{} - {:.2}K", summary, self.temperature())?;
        if let Some(name) = &self.location_name {
            write!(f, " ({})", name)?;
        }
        Ok(())
    }
}

/// Raw current-weather response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CurrentWeatherResponse {
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    main: Option<MainData>,
    #[serde(default)]
    visibility: Option<f64>,
    #[serde(default)]
    wind: Option<Wind>,
    #[serde(default)]
    rain: Option<Precipitation>,
    #[serde(default)]
    snow: Option<Precipitation>,
    #[serde(default)]
    clouds: Option<Clouds>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct MainData {
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct Clouds {
    #[serde(default)]
    all: Option<f64>,
}

impl From<CurrentWeatherResponse> for ProviderObservation {
    fn from(raw: CurrentWeatherResponse) -> Self {
        Self {
            temperature_kelvin: raw.main.and_then(|m| m.temp),
            humidity_percent: raw.main.and_then(|m| m.humidity),
            cloud_percent: raw.clouds.and_then(|c| c.all),
            rain: raw.rain,
            snow: raw.snow,
            visibility_m: raw.visibility,
            condition: raw.weather.into_iter().next(),
            wind: raw.wind,
            location_name: raw.name.filter(|n| !n.is_empty()),
        }
    }
}
