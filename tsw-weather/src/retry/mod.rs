//! Resilient request execution.
//!
//! Wraps an arbitrary fallible async operation with bounded retry and
//! exponential backoff. Both outbound clients (simulation feed and weather
//! provider) route every request through a [`RetryExecutor`].
//!
//! # Behaviour
//!
//! ```text
//! attempt ──► Ok ─────────────────────────────► Ok(value)
//!    │
//!    └──► Err ──► attempts left? ──► no ──────► Err(Exhausted { last error })
//!                     │
//!                     └──► yes ──► warn!, sleep(backoff) ──► attempt
//!
//! cancellation (at any point) ─────────────────► Err(Cancelled)
//! ```
//!
//! The only side effect is one `warn!` event per retry.

mod policy;

pub use policy::{
    RetryPolicy, BACKOFF_FACTOR, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY_SECS,
};

use std::fmt;
use std::future::Future;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Failure of a retried operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryError<E> {
    /// Every attempt failed; carries the error from the last one.
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last error observed.
        source: E,
    },
    /// The caller cancelled the operation. No further attempts were made.
    Cancelled,
}

impl<E> RetryError<E> {
    /// Returns true if the operation was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled)
    }

    /// The last underlying error, if attempts were exhausted.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Cancelled => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted { attempts, source } => {
                write!(f, "gave up after {} attempt(s): {}", attempts, source)
            }
            RetryError::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Cancelled => None,
        }
    }
}

/// Executes operations under a [`RetryPolicy`].
#[derive(Clone, Debug)]
pub struct RetryExecutor {
    /// Label used in diagnostics ("simulation", "openweather", ...).
    name: &'static str,
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create an executor for the named service.
    pub fn new(name: &'static str, policy: RetryPolicy) -> Self {
        Self { name, policy }
    }

    /// The policy this executor applies.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds or the policy's attempts are exhausted.
    pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.execute_cancellable(op, &CancellationToken::new()).await
    }

    /// Run `op` with retries, stopping immediately when `cancel` fires.
    ///
    /// Cancellation is observed before each attempt, during an attempt and
    /// during the backoff sleep. It is reported as [`RetryError::Cancelled`],
    /// never as exhaustion.
    pub async fn execute_cancellable<T, E, F, Fut>(
        &self,
        mut op: F,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.policy.attempts();
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                result = op() => result,
            };

            let error = match result {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(service = self.name, attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if attempt >= max_attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: error,
                });
            }

            let sample = if self.policy.jitter {
                rand::rng().random::<f64>()
            } else {
                0.0
            };
            let delay = self.policy.delay_for_retry(attempt - 1, sample);

            warn!(
                service = self.name,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Request failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
