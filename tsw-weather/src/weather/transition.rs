//! Smooth weather transitions.
//!
//! The [`TransitionEngine`] owns the authoritative "current" weather vector.
//! When a new target arrives it interpolates from wherever the simulation is
//! now to the target over a fixed duration, pushing an intermediate vector on
//! every tick.
//!
//! # Concurrency
//!
//! At most one transition task exists per engine. [`TransitionEngine::retarget`]
//! cancels the running task and waits for it to exit before spawning the next
//! one, so two loops never push at the same time.
//!
//! ```text
//! retarget(A) ──► task A: push, push, push ─┐ cancel
//! retarget(B) ──────────── cancel + join ◄──┘
//!                                      └──► task B: push, ..., push(B) done
//! ```
//!
//! Progress is recomputed from elapsed time on each tick, so the final push
//! equals the target exactly. Cancellation is only observed between pushes:
//! a push that has started always sends all six channels, and the current
//! vector is updated once it has been sent.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::feed::SimulationFeed;

use super::WeatherVector;

/// Default cadence of intermediate pushes.
pub const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// How a transition task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Reached the target.
    Completed,
    /// Superseded or stopped before reaching the target.
    Cancelled,
}

struct ActiveTransition {
    cancel: CancellationToken,
    task: JoinHandle<TransitionOutcome>,
}

/// Interpolates the simulation's weather toward the latest target.
pub struct TransitionEngine<F: SimulationFeed + 'static> {
    feed: Arc<F>,
    duration: Duration,
    push_interval: Duration,
    current: Arc<Mutex<WeatherVector>>,
    target: Mutex<Option<WeatherVector>>,
    active: tokio::sync::Mutex<Option<ActiveTransition>>,
}

impl<F: SimulationFeed + 'static> TransitionEngine<F> {
    /// Create an engine that transitions over `duration`.
    ///
    /// The current vector starts at all zeros.
    pub fn new(feed: Arc<F>, duration: Duration) -> Self {
        Self {
            feed,
            duration,
            push_interval: DEFAULT_PUSH_INTERVAL,
            current: Arc::new(Mutex::new(WeatherVector::default())),
            target: Mutex::new(None),
            active: tokio::sync::Mutex::new(None),
        }
    }

    /// Set the cadence of intermediate pushes.
    pub fn with_push_interval(mut self, interval: Duration) -> Self {
        self.push_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Weather most recently applied to the simulation.
    pub fn current(&self) -> WeatherVector {
        *self.current.lock()
    }

    /// Target of the latest transition, if any.
    pub fn target(&self) -> Option<WeatherVector> {
        *self.target.lock()
    }

    /// Returns true while a transition task is running.
    pub fn is_transitioning(&self) -> bool {
        match self.active.try_lock() {
            Ok(active) => active.as_ref().is_some_and(|t| !t.task.is_finished()),
            // A retarget or stop is in progress
            Err(_) => true,
        }
    }

    /// Start moving toward `target`, superseding any running transition.
    pub async fn retarget(&self, target: WeatherVector) {
        let mut active = self.active.lock().await;

        if let Some(previous) = active.take() {
            cancel_and_join(previous).await;
        }

        let start = self.current();
        *self.target.lock() = Some(target);

        info!(
            duration_secs = self.duration.as_secs_f64(),
            "Starting weather transition"
        );
        debug!(from = %start, to = %target, "Transition endpoints");

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_transition(
            Arc::clone(&self.feed),
            Arc::clone(&self.current),
            start,
            target,
            self.duration,
            self.push_interval,
            cancel.clone(),
        ));

        *active = Some(ActiveTransition { cancel, task });
    }

    /// Cancel any running transition and wait for it to exit.
    ///
    /// The current vector stays wherever the transition left it.
    pub async fn stop(&self) -> Option<TransitionOutcome> {
        let previous = self.active.lock().await.take()?;
        cancel_and_join(previous).await
    }

    /// Wait for the running transition to finish on its own.
    pub async fn join(&self) -> Option<TransitionOutcome> {
        let mut active = self.active.lock().await;
        let transition = active.take()?;
        join_task(transition.task).await
    }
}

async fn cancel_and_join(transition: ActiveTransition) -> Option<TransitionOutcome> {
    transition.cancel.cancel();
    join_task(transition.task).await
}

async fn join_task(task: JoinHandle<TransitionOutcome>) -> Option<TransitionOutcome> {
    match task.await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            warn!(error = %e, "Weather transition task failed");
            None
        }
    }
}

/// Fraction of the transition elapsed, in `[0, 1]`.
fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

async fn run_transition<F: SimulationFeed>(
    feed: Arc<F>,
    current: Arc<Mutex<WeatherVector>>,
    start: WeatherVector,
    target: WeatherVector,
    duration: Duration,
    push_interval: Duration,
    cancel: CancellationToken,
) -> TransitionOutcome {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(push_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Weather transition cancelled");
                return TransitionOutcome::Cancelled;
            }
            _ = ticker.tick() => {}
        }

        let progress = progress(started.elapsed(), duration);
        let vector = start.lerp(&target, progress);

        // A failed push is not fatal; the next tick sends a fresher vector
        if let Err(e) = feed.push_weather(&vector).await {
            warn!(error = %e, "Failed to push weather update");
        }
        *current.lock() = vector;

        if progress >= 1.0 {
            info!(weather = %vector, "Weather transition complete");
            return TransitionOutcome::Completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::MockFeed;

    fn uniform(v: f64) -> WeatherVector {
        WeatherVector {
            temperature: v,
            cloudiness: v / 100.0,
            precipitation: v / 100.0,
            wetness: v / 100.0,
            ground_snow: v / 100.0,
            fog_density: v / 1000.0,
        }
    }

    fn engine(feed: &Arc<MockFeed>, secs: u64) -> TransitionEngine<MockFeed> {
        TransitionEngine::new(Arc::clone(feed), Duration::from_secs(secs))
    }

    #[test]
    fn test_progress() {
        let ten = Duration::from_secs(10);
        assert_eq!(progress(Duration::ZERO, ten), 0.0);
        assert_eq!(progress(Duration::from_secs(5), ten), 0.5);
        assert_eq!(progress(Duration::from_secs(30), ten), 1.0);
        assert_eq!(progress(Duration::from_secs(1), Duration::ZERO), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_reaches_target_exactly() {
        let feed = Arc::new(MockFeed::new());
        let engine = engine(&feed, 10);
        let target = uniform(73.3);

        engine.retarget(target).await;
        assert_eq!(engine.join().await, Some(TransitionOutcome::Completed));

        let pushes = feed.pushes();
        assert_eq!(pushes.len(), 11);
        assert_eq!(pushes[0], WeatherVector::default());
        assert_eq!(*pushes.last().unwrap(), target);
        assert_eq!(engine.current(), target);
        assert_eq!(engine.target(), Some(target));
        assert!(!engine.is_transitioning());

        for pair in pushes.windows(2) {
            for ((_, a), (_, b)) in pair[0].channels().iter().zip(pair[1].channels().iter()) {
                assert!(b >= a, "channel decreased: {} -> {}", a, b);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_jumps_to_target() {
        let feed = Arc::new(MockFeed::new());
        let engine = engine(&feed, 0);

        engine.retarget(uniform(5.0)).await;
        engine.join().await;

        assert_eq!(feed.pushes(), vec![uniform(5.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retarget_cancels_previous_transition() {
        let feed = Arc::new(MockFeed::new());
        let engine = engine(&feed, 10);

        engine.retarget(uniform(100.0)).await;
        tokio::time::sleep(Duration::from_millis(3500)).await;

        let first_leg = feed.pushes().len();
        assert_eq!(first_leg, 4);
        let snapshot = engine.current();
        assert!((snapshot.temperature - 30.0).abs() < 1e-9);

        let second = uniform(-100.0);
        engine.retarget(second).await;
        assert_eq!(engine.join().await, Some(TransitionOutcome::Completed));

        let pushes = feed.pushes();
        // Nothing after the retarget moves toward the superseded target
        for push in &pushes[first_leg..] {
            assert!(push.temperature <= snapshot.temperature + 1e-9);
        }
        assert_eq!(pushes[first_leg], snapshot);
        assert_eq!(*pushes.last().unwrap(), second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_leaves_current_in_place() {
        let feed = Arc::new(MockFeed::new());
        let engine = engine(&feed, 10);

        engine.retarget(uniform(50.0)).await;
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(engine.is_transitioning());

        assert_eq!(engine.stop().await, Some(TransitionOutcome::Cancelled));
        assert!(!engine.is_transitioning());

        let pushed = feed.pushes().len();
        let current = engine.current();
        assert!((current.temperature - 10.0).abs() < 1e-9);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(feed.pushes().len(), pushed);
        assert_eq!(engine.current(), current);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_failures_do_not_abort_transition() {
        let feed = Arc::new(MockFeed::new());
        feed.fail_pushes(true);
        let engine = engine(&feed, 3);

        engine.retarget(uniform(9.0)).await;
        assert_eq!(engine.join().await, Some(TransitionOutcome::Completed));
        assert_eq!(engine.current(), uniform(9.0));
        assert_eq!(feed.push_attempts(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_push_interval() {
        let feed = Arc::new(MockFeed::new());
        let engine = engine(&feed, 1).with_push_interval(Duration::from_millis(250));

        engine.retarget(uniform(4.0)).await;
        engine.join().await;

        assert_eq!(feed.pushes().len(), 5);
    }

    #[tokio::test]
    async fn test_stop_without_transition() {
        let feed = Arc::new(MockFeed::new());
        let engine = engine(&feed, 10);
        assert_eq!(engine.stop().await, None);
        assert_eq!(engine.target(), None);
    }
}
