//! Timer - fixed-interval and one-shot scheduling with cancellation.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// What a repeating timer does after an action returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerControl {
    Continue,
    Stop,
}

type Action = Arc<dyn Fn() -> BoxFuture<'static, TimerControl> + Send + Sync>;

/// Timer - a spawned scheduled task.
///
/// A repeating timer first fires one interval after creation, then every
/// interval. Ticks missed while an action was still running are delayed, not
/// bunched up.
pub struct Timer {
    /// Timer ID.
    id: String,

    /// Timer interval (or delay for one-shot timers).
    interval: Duration,

    /// Whether the timer repeats.
    repeating: bool,

    /// Cancellation handle.
    token: CancellationToken,

    /// Fire count.
    fire_count: Arc<AtomicU64>,
}

impl Timer {
    /// Create a one-shot timer.
    ///
    /// Fires once after the specified delay.
    pub fn once<F, Fut>(id: impl Into<String>, delay: Duration, action: F) -> Arc<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action: Action = Arc::new(move || -> BoxFuture<'static, TimerControl> {
            let fut = action();
            Box::pin(async move {
                fut.await;
                TimerControl::Stop
            })
        });
        Self::spawn(id.into(), delay, false, action)
    }

    /// Create a repeating timer.
    ///
    /// Fires at the specified interval until cancelled or until the action
    /// returns [`TimerControl::Stop`].
    pub fn repeating<F, Fut>(id: impl Into<String>, interval: Duration, action: F) -> Arc<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TimerControl> + Send + 'static,
    {
        let action: Action =
            Arc::new(move || -> BoxFuture<'static, TimerControl> { Box::pin(action()) });
        Self::spawn(id.into(), interval, true, action)
    }

    fn spawn(id: String, interval: Duration, repeating: bool, action: Action) -> Arc<Self> {
        let timer = Arc::new(Self {
            id,
            interval,
            repeating,
            token: CancellationToken::new(),
            fire_count: Arc::new(AtomicU64::new(0)),
        });

        let token = timer.token.clone();
        let fire_count = timer.fire_count.clone();
        let id = timer.id.clone();

        tokio::spawn(async move {
            if repeating {
                Self::run_repeating(&id, interval, action, token, fire_count).await;
            } else {
                Self::run_once(&id, interval, action, token, fire_count).await;
            }
        });

        debug!(
            "Timer {} scheduled ({}, {} ms)",
            timer.id,
            if repeating { "repeating" } else { "once" },
            interval.as_millis()
        );
        timer
    }

    async fn run_once(
        id: &str,
        delay: Duration,
        action: Action,
        token: CancellationToken,
        fire_count: Arc<AtomicU64>,
    ) {
        tokio::select! {
            _ = token.cancelled() => {
                trace!("Timer {} cancelled before firing", id);
            }
            _ = time::sleep(delay) => {
                fire_count.fetch_add(1, Ordering::Relaxed);
                action().await;
                token.cancel();
            }
        }
    }

    async fn run_repeating(
        id: &str,
        interval: Duration,
        action: Action,
        token: CancellationToken,
        fire_count: Arc<AtomicU64>,
    ) {
        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("Timer {} cancelled", id);
                    return;
                }
                _ = ticker.tick() => {}
            }

            fire_count.fetch_add(1, Ordering::Relaxed);
            if action().await == TimerControl::Stop {
                debug!("Timer {} stopped by its action", id);
                token.cancel();
                return;
            }
        }
    }

    /// Get the timer ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if the timer repeats.
    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    /// Check if the timer is still scheduled.
    pub fn is_valid(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Get the fire count.
    pub fn fire_count(&self) -> u64 {
        self.fire_count.load(Ordering::Relaxed)
    }

    /// Cancel the timer. An action already running finishes first.
    pub fn cancel(&self) {
        self.token.cancel();
        debug!("Timer {} cancelled", self.id);
    }
}

/// Every timer belonging to one page process.
///
/// Cancelling the group (or dropping it) cancels every timer it holds, the
/// way closing a tab tears down its intervals.
#[derive(Default)]
pub struct TimerGroup {
    timers: Mutex<Vec<Arc<Timer>>>,
}

impl TimerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a timer; finished timers are pruned on the way.
    pub fn add(&self, timer: Arc<Timer>) -> Arc<Timer> {
        let mut timers = self.timers.lock();
        timers.retain(|t| t.is_valid());
        timers.push(timer.clone());
        timer
    }

    /// Number of timers still scheduled.
    pub fn active(&self) -> usize {
        self.timers.lock().iter().filter(|t| t.is_valid()).count()
    }

    pub fn cancel_all(&self) {
        let timers = std::mem::take(&mut *self.timers.lock());
        for timer in timers {
            timer.cancel();
        }
    }
}

impl Drop for TimerGroup {
    fn drop(&mut self) {
        for timer in self.timers.get_mut().drain(..) {
            timer.token.cancel();
        }
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
