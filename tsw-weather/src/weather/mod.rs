//! Simulation-facing weather state.
//!
//! The simulation models weather as six independent scalar channels. This
//! module provides that vector, the mapping from a provider observation
//! ([`converter`]) and the engine that moves the simulation smoothly from one
//! vector to the next ([`transition`]).

pub mod converter;
pub mod transition;

pub use converter::{convert, ConversionConstants, WeatherConverter};
pub use transition::{TransitionEngine, TransitionOutcome, DEFAULT_PUSH_INTERVAL};

use std::fmt;

/// Simulation channel names, in push order.
pub const CHANNELS: [&str; 6] = [
    "Temperature",
    "Cloudiness",
    "Precipitation",
    "Wetness",
    "GroundSnow",
    "FogDensity",
];

/// One instant of simulation weather.
///
/// | Channel | Unit / range |
/// |---|---|
/// | `temperature` | °C, unbounded |
/// | `cloudiness` | 0 (clear) to 1 (overcast) |
/// | `precipitation` | 0 (none) to 1 (heavy) |
/// | `wetness` | 0 (dry) to 1 (wet) |
/// | `ground_snow` | 0 (none) to 1 (heavy) |
/// | `fog_density` | 0 (clear) to 0.1 (dense) |
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeatherVector {
    pub temperature: f64,
    pub cloudiness: f64,
    pub precipitation: f64,
    pub wetness: f64,
    pub ground_snow: f64,
    pub fog_density: f64,
}

impl WeatherVector {
    /// Channel name and value pairs, in [`CHANNELS`] order.
    pub fn channels(&self) -> [(&'static str, f64); 6] {
        [
            (CHANNELS[0], self.temperature),
            (CHANNELS[1], self.cloudiness),
            (CHANNELS[2], self.precipitation),
            (CHANNELS[3], self.wetness),
            (CHANNELS[4], self.ground_snow),
            (CHANNELS[5], self.fog_density),
        ]
    }

    /// Linear interpolation from `self` toward `target`.
    ///
    /// `progress` is clamped to `[0, 1]`. At 0 the result equals `self`; at 1
    /// it equals `target` exactly, with no floating-point residue.
    pub fn lerp(&self, target: &WeatherVector, progress: f64) -> WeatherVector {
        if progress >= 1.0 {
            return *target;
        }
        if progress <= 0.0 || progress.is_nan() {
            return *self;
        }

        let mix = |start: f64, end: f64| start + (end - start) * progress;
        WeatherVector {
            temperature: mix(self.temperature, target.temperature),
            cloudiness: mix(self.cloudiness, target.cloudiness),
            precipitation: mix(self.precipitation, target.precipitation),
            wetness: mix(self.wetness, target.wetness),
            ground_snow: mix(self.ground_snow, target.ground_snow),
            fog_density: mix(self.fog_density, target.fog_density),
        }
    }
}

impl fmt::Display for WeatherVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Temp={:.1}°C, Cloud={:.2}, Precip={:.2}, Wet={:.2}, Snow={:.2}, Fog={:.3}",
            self.temperature,
            self.cloudiness,
            self.precipitation,
            self.wetness,
            self.ground_snow,
            self.fog_density
        )
    }
}
