//! Provider observation to simulation weather mapping.
//!
//! The mapping is deterministic and free of side effects. Its tuning
//! constants are heuristic, so they live in [`ConversionConstants`] and can be
//! overridden from configuration.

use crate::provider::ProviderObservation;

use super::WeatherVector;

/// Offset between Kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Tuning constants for [`WeatherConverter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionConstants {
    /// Combined rain + snow intensity (mm/h) that maps to full precipitation.
    pub precipitation_saturation_mm_h: f64,
    /// Weight of precipitation in wetness.
    pub wetness_precipitation_weight: f64,
    /// Weight of relative humidity in wetness.
    pub wetness_humidity_weight: f64,
    /// Snow intensity (mm/h) that maps to full ground snow.
    pub ground_snow_saturation_mm_h: f64,
    /// Visibility (km) at or below which fog is at maximum.
    pub fog_min_visibility_km: f64,
    /// Visibility (km) at or above which there is no fog.
    pub fog_max_visibility_km: f64,
    /// Maximum fog channel value.
    pub max_fog_density: f64,
}

impl Default for ConversionConstants {
    fn default() -> Self {
        Self {
            precipitation_saturation_mm_h: 10.0,
            wetness_precipitation_weight: 0.7,
            wetness_humidity_weight: 0.3,
            ground_snow_saturation_mm_h: 5.0,
            fog_min_visibility_km: 1.0,
            fog_max_visibility_km: 10.0,
            max_fog_density: 0.1,
        }
    }
}

/// Maps provider observations into the simulation's weather channels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeatherConverter {
    constants: ConversionConstants,
}

impl WeatherConverter {
    pub fn new(constants: ConversionConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &ConversionConstants {
        &self.constants
    }

    /// Convert one observation.
    pub fn convert(&self, obs: &ProviderObservation) -> WeatherVector {
        let c = &self.constants;

        let precipitation =
            saturate(obs.rain_1h() + obs.snow_1h(), c.precipitation_saturation_mm_h);

        let wetness = (c.wetness_precipitation_weight * precipitation
            + c.wetness_humidity_weight * (obs.humidity() / 100.0))
            .clamp(0.0, 1.0);

        // Reported snow volume is ignored unless the condition is snow
        let ground_snow = if obs.is_snowing() {
            saturate(obs.snow_1h(), c.ground_snow_saturation_mm_h)
        } else {
            0.0
        };

        WeatherVector {
            temperature: obs.temperature() - KELVIN_OFFSET,
            cloudiness: (obs.clouds() / 100.0).clamp(0.0, 1.0),
            precipitation,
            wetness,
            ground_snow,
            fog_density: self.fog_density(obs.visibility_m),
        }
    }

    /// Fog from visibility; absent visibility means clear.
    fn fog_density(&self, visibility_m: Option<f64>) -> f64 {
        let c = &self.constants;
        let Some(visibility_m) = visibility_m else {
            return 0.0;
        };

        let km = visibility_m / 1000.0;
        if km >= c.fog_max_visibility_km {
            0.0
        } else if km <= c.fog_min_visibility_km {
            c.max_fog_density
        } else {
            let span = c.fog_max_visibility_km - c.fog_min_visibility_km;
            c.max_fog_density * (1.0 - (km - c.fog_min_visibility_km) / span)
        }
    }
}

/// Convert with the default constants.
pub fn convert(obs: &ProviderObservation) -> WeatherVector {
    WeatherConverter::default().convert(obs)
}

fn saturate(value: f64, saturation: f64) -> f64 {
    if saturation <= 0.0 {
        return if value > 0.0 { 1.0 } else { 0.0 };
    }
    (value / saturation).clamp(0.0, 1.0)
}
