//! Client-side reconstruction of the round countdown from a timer snapshot.
//!
//! Observers never decrement a counter. They anchor a deadline on their own
//! clock when a snapshot arrives and derive the time left from it on every
//! read, so a client that sleeps or redraws irregularly still shows the right
//! value.

use crate::dto::snapshot::TimerSnapshot;

/// Countdown anchored on the local clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciledClock {
    remaining_ms: u64,
    running: bool,
    deadline_ms: i64,
}

impl ReconciledClock {
    /// Anchor `timer` on the local clock, `local_now_ms` being the local Unix time on receipt.
    ///
    /// `latency = localNow - serverTimestamp` and, while running,
    /// `deadline = localNow + remaining - latency`.
    pub fn sync(timer: &TimerSnapshot, local_now_ms: u64) -> Self {
        let local_now = to_signed(local_now_ms);
        let latency = local_now - to_signed(timer.server_timestamp);
        let deadline_ms = local_now + to_signed(timer.remaining_time) - latency;

        Self {
            remaining_ms: timer.remaining_time,
            running: timer.is_running,
            deadline_ms,
        }
    }

    /// Milliseconds left at local time `local_now_ms`.
    pub fn time_left_ms(&self, local_now_ms: u64) -> u64 {
        if !self.running {
            return self.remaining_ms;
        }
        let left = self.deadline_ms - to_signed(local_now_ms);
        u64::try_from(left.max(0)).unwrap_or_default()
    }

    /// Whether the countdown is live.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

fn to_signed(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}
