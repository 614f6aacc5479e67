//! Outbound send rate limiter
//!
//! The protocol allows 120 frames per rolling 60-second window; a slice of
//! that budget is reserved as headroom for heartbeats and lifecycle frames,
//! which bypass this limiter entirely (the service enforces heartbeat timing
//! itself, and locally throttling them risks a false liveness failure).

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default admitted sends per window (120 protocol budget minus headroom)
pub const DEFAULT_CAPACITY: usize = 110;

/// Default rolling window length
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window rate limiter with FIFO admission
///
/// Callers queue on the internal lock in arrival order; a slot frees
/// strictly by elapsed time.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: usize,
    window: Duration,
    sends: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the protocol defaults
    #[must_use]
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_CAPACITY, DEFAULT_WINDOW)
    }

    /// Create a limiter with a custom budget
    #[must_use]
    pub fn with_budget(capacity: usize, window: Duration) -> Self {
        Self {
            capacity,
            window,
            sends: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Acquire a send slot, suspending until the window admits one.
    ///
    /// The slot is reserved at return; the caller must perform its send.
    pub async fn acquire(&self) {
        // The tokio mutex queues waiters fairly, which is what gives
        // admission its FIFO order: a caller sleeping for a slot holds the
        // lock, and later callers line up behind it.
        let mut sends = self.sends.lock().await;
        loop {
            let now = Instant::now();
            while sends
                .front()
                .is_some_and(|&sent| now.duration_since(sent) >= self.window)
            {
                sends.pop_front();
            }

            if sends.len() < self.capacity {
                sends.push_back(now);
                return;
            }

            let oldest = *sends.front().expect("queue is at capacity");
            tokio::time::sleep_until(oldest + self.window).await;
        }
    }

    /// Slots currently available without waiting
    pub async fn available(&self) -> usize {
        let mut sends = self.sends.lock().await;
        let now = Instant::now();
        while sends
            .front()
            .is_some_and(|&sent| now.duration_since(sent) >= self.window)
        {
            sends.pop_front();
        }
        self.capacity - sends.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
