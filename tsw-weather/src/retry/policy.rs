//! Retry policy for outbound requests.
//!
//! A [`RetryPolicy`] is immutable and supplied when a client is constructed.
//! It controls how many times an operation is attempted and how long the
//! [`RetryExecutor`](super::RetryExecutor) waits between attempts.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tsw_weather::retry::RetryPolicy;
//!
//! // Six attempts: 100ms, 200ms, 400ms, 800ms, 1600ms between them
//! let policy = RetryPolicy::exponential(6).with_jitter(false);
//! assert_eq!(policy.base_delay(0), Duration::from_millis(100));
//! assert_eq!(policy.base_delay(4), Duration::from_millis(1600));
//! ```

use std::time::Duration;

// =============================================================================
// Retry Policy Constants
// =============================================================================

/// Default total number of attempts (one initial call plus five retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Default initial delay for exponential backoff (100ms).
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 100;

/// Default maximum delay for exponential backoff (30 seconds).
pub const DEFAULT_MAX_DELAY_SECS: u64 = 30;

/// Multiplier applied to the delay after each failed attempt.
pub const BACKOFF_FACTOR: f64 = 2.0;

/// How a client handles transient failures.
///
/// The delay before retry `n` (0-based) is `initial_delay * 2^n`, capped at
/// `max_delay`. With jitter enabled a random fraction in `[0, 1)` of that
/// delay is added on top, so concurrent clients do not retry in lockstep.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the initial attempt.
    ///
    /// Zero is treated as one: an operation is always attempted once.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the exponential delay (before jitter).
    pub max_delay: Duration,
    /// Whether to randomise each delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    /// Creates an exponential backoff policy with sensible defaults.
    ///
    /// Uses:
    /// - Initial delay: 100ms ([`DEFAULT_INITIAL_DELAY_MS`])
    /// - Max delay: 30 seconds ([`DEFAULT_MAX_DELAY_SECS`])
    /// - Jitter enabled
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum number of attempts (including initial)
    pub fn exponential(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            jitter: true,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::exponential(1)
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the cap on the exponential delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns the effective number of attempts (never less than one).
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Exponential delay before retry `retry_index` (0-based), without jitter.
    pub fn base_delay(&self, retry_index: u32) -> Duration {
        let factor = BACKOFF_FACTOR.powi(retry_index.min(i32::MAX as u32) as i32);
        let delay_ms = self.initial_delay.as_millis() as f64 * factor;
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }

    /// Delay before retry `retry_index` given a jitter sample in `[0, 1)`.
    ///
    /// The sample is ignored when jitter is disabled.
    pub fn delay_for_retry(&self, retry_index: u32, jitter_sample: f64) -> Duration {
        let base = self.base_delay(retry_index);
        if !self.jitter {
            return base;
        }
        base + base.mul_f64(jitter_sample.clamp(0.0, 1.0))
    }

    /// Upper bound on total time spent waiting between attempts.
    ///
    /// Does not include the time spent in the attempts themselves.
    pub fn max_total_delay(&self) -> Duration {
        let retries = self.attempts() - 1;
        let sum: Duration = (0..retries).map(|i| self.base_delay(i)).sum();
        if self.jitter {
            sum * 2
        } else {
            sum
        }
    }
}
