//! Displacement admission.
//!
//! Decides when the train has travelled far enough for a fresh weather
//! observation. Position deltas accumulate until the running total reaches
//! the threshold, at which point one fetch is admitted and the total resets.

/// Deltas at or below this distance are treated as GPS jitter.
pub const MIN_MOVEMENT_METERS: f64 = 0.1;

/// Slack allowed when comparing the total against the threshold, so that
/// deltas summing to the threshold admit despite rounding.
const THRESHOLD_TOLERANCE_METERS: f64 = 1e-6;

/// Running displacement total.
///
/// Summed in meters and reported in kilometers. Always non-negative, and
/// never holds a value at or above the threshold after
/// [`record`](Self::record) returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacementAccumulator {
    threshold_km: f64,
    total_meters: f64,
}

impl DisplacementAccumulator {
    pub fn new(threshold_km: f64) -> Self {
        Self {
            threshold_km,
            total_meters: 0.0,
        }
    }

    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
    }

    /// Distance accumulated since the last admitted fetch.
    pub fn total_km(&self) -> f64 {
        self.total_meters / 1000.0
    }

    /// Record one position delta in meters.
    ///
    /// Returns the accumulated distance when it reaches the threshold; the
    /// total is reset to zero in that case.
    pub fn record(&mut self, delta_meters: f64) -> Option<f64> {
        if delta_meters.is_nan() || delta_meters <= MIN_MOVEMENT_METERS {
            return None;
        }

        self.total_meters += delta_meters;
        let threshold_meters = self.threshold_km * 1000.0;
        if self.total_meters + THRESHOLD_TOLERANCE_METERS >= threshold_meters {
            let reached = self.total_km();
            self.reset();
            return Some(reached);
        }
        None
    }

    /// Discard the accumulated distance.
    pub fn reset(&mut self) {
        self.total_meters = 0.0;
    }
}
