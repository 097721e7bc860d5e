//! Sliding-window rate limiter.
//!
//! Tracks the timestamps of recent acquisitions in a window and suspends
//! callers until a slot frees up. Callers are never rejected, only delayed,
//! so the limiter imposes a throughput ceiling without surfacing errors.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Suspending sliding-window rate limiter.
///
/// Shared between concurrent callers behind an `Arc`; the window state is a
/// single mutex-guarded queue of acquisition timestamps.
pub struct RateLimiter {
    max_per_window: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_per_window` acquisitions per `window`.
    #[must_use]
    pub fn new(max_per_window: usize, window: Duration) -> Self {
        Self {
            max_per_window: max_per_window.max(1),
            window,
            timestamps: Mutex::new(VecDeque::with_capacity(max_per_window.max(1))),
        }
    }

    /// Creates a limiter allowing `max` acquisitions per minute.
    #[must_use]
    pub fn per_minute(max: usize) -> Self {
        Self::new(max, Duration::from_secs(60))
    }

    /// Acquires one slot, sleeping until the window has room.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut stamps = self.timestamps.lock().await;
                let now = Instant::now();
                while stamps
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    stamps.pop_front();
                }
                if stamps.len() < self.max_per_window {
                    stamps.push_back(now);
                    return;
                }
                // the oldest entry decides when the next slot frees
                stamps.front().map_or(Duration::ZERO, |oldest| {
                    self.window.saturating_sub(now.duration_since(*oldest))
                })
            };
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    /// Number of acquisitions currently inside the window.
    pub async fn in_flight(&self) -> usize {
        let mut stamps = self.timestamps.lock().await;
        let now = Instant::now();
        while stamps
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            stamps.pop_front();
        }
        stamps.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
