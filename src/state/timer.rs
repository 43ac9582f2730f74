//! Authoritative round timer.
//!
//! Remaining time is banked from monotonic clock deltas whenever the timer is
//! paused, never decremented tick by tick, so irregular polling or an idle
//! process cannot make it drift. Observers only ever receive [`TimerState`]
//! snapshots stamped with the server wall clock and rebuild the countdown from those.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use tokio::{
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::debug;

/// Callback fired by the safety net with the run number it was armed for.
pub type ExpiryHook = Arc<dyn Fn(u64) + Send + Sync>;

/// Snapshot of the timer shared with observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    /// Configured round length in milliseconds.
    pub total_duration_ms: u64,
    /// Time left at `server_timestamp_ms`, in milliseconds.
    pub remaining_ms: u64,
    /// Whether the countdown is live.
    pub is_running: bool,
    /// Server wall clock (Unix epoch milliseconds) when the snapshot was taken.
    pub server_timestamp_ms: u64,
}

/// Start/pause/reset countdown with a one-shot expiry safety net.
pub struct Timer {
    total: Duration,
    remaining: Duration,
    last_updated: Option<Instant>,
    running: bool,
    run: u64,
    on_expired: Option<ExpiryHook>,
    safety_net: Option<JoinHandle<()>>,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("total", &self.total)
            .field("remaining", &self.remaining)
            .field("last_updated", &self.last_updated)
            .field("running", &self.running)
            .field("run", &self.run)
            .field("armed", &self.safety_net.is_some())
            .finish()
    }
}

impl Timer {
    /// Build a stopped timer holding `total` of remaining time.
    ///
    /// Without an expiry hook no safety net is scheduled, which keeps the timer
    /// usable outside of a Tokio runtime.
    pub fn new(total: Duration) -> Self {
        Self {
            total,
            remaining: total,
            last_updated: None,
            running: false,
            run: 0,
            on_expired: None,
            safety_net: None,
        }
    }

    /// Install the callback invoked when a run reaches zero.
    ///
    /// The hook must only enqueue work; it runs on a spawned task.
    pub fn with_expiry_hook(mut self, hook: ExpiryHook) -> Self {
        self.on_expired = Some(hook);
        self
    }

    /// Start or resume the countdown. No-op when already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }

        self.running = true;
        self.last_updated = Some(Instant::now());
        self.run += 1;

        if let Some(hook) = self.on_expired.clone() {
            let run = self.run;
            let deadline = Instant::now() + self.remaining;
            self.safety_net = Some(tokio::spawn(async move {
                sleep_until(deadline).await;
                hook(run);
            }));
        }
    }

    /// Bank the elapsed time and stop the countdown. No-op when not running.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }

        let now = Instant::now();
        if let Some(last) = self.last_updated {
            let elapsed = now.saturating_duration_since(last);
            self.remaining = self.remaining.saturating_sub(elapsed);
        }

        self.running = false;
        self.last_updated = Some(now);
        self.cancel_safety_net();
    }

    /// Stop the timer and refill it with `total`, or with the previous total when `None`.
    pub fn reset(&mut self, total: Option<Duration>) {
        self.pause();
        if let Some(total) = total {
            self.total = total;
        }
        self.remaining = self.total;
    }

    /// Force the timer to zero once its safety net fired.
    pub fn expire(&mut self) {
        self.cancel_safety_net();
        self.running = false;
        self.remaining = Duration::ZERO;
        self.last_updated = Some(Instant::now());
    }

    /// Whether the countdown is live.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of the latest `start()` call, used to recognise stale expiry notices.
    pub fn current_run(&self) -> u64 {
        self.run
    }

    /// Configured round length.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time left right now, accounting for a live run.
    pub fn remaining(&self) -> Duration {
        match (self.running, self.last_updated) {
            (true, Some(last)) => self
                .remaining
                .saturating_sub(Instant::now().saturating_duration_since(last)),
            _ => self.remaining,
        }
    }

    /// Time consumed out of the total.
    pub fn elapsed(&self) -> Duration {
        self.total.saturating_sub(self.remaining())
    }

    /// Snapshot for observers.
    pub fn state(&self) -> TimerState {
        TimerState {
            total_duration_ms: duration_ms(self.total),
            remaining_ms: duration_ms(self.remaining()),
            is_running: self.running,
            server_timestamp_ms: unix_now_ms(),
        }
    }

    fn cancel_safety_net(&mut self) {
        if let Some(handle) = self.safety_net.take() {
            handle.abort();
            debug!(run = self.run, "timer safety net cancelled");
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(handle) = self.safety_net.take() {
            handle.abort();
        }
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Current wall clock as Unix epoch milliseconds.
pub fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or_default()
}
