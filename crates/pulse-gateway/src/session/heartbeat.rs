//! Heartbeat liveness state
//!
//! Tracks the interval handed down in HELLO, the acknowledgement flag, and
//! the send/ack instants whose difference is the reported latency. The loop
//! that drives this state lives on the session; a reconnect hard-restarts it
//! through the reset signal.

use super::signal::Flag;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Fallback interval until the first HELLO arrives
const DEFAULT_INTERVAL: Duration = Duration::from_secs(45);

/// Heartbeat state shared between the heartbeat loop and the receive loop
#[derive(Debug)]
pub struct Heartbeat {
    interval: Mutex<Duration>,
    acked: Flag,
    reset: Flag,
    last_send: Mutex<Instant>,
    last_ack: Mutex<Instant>,
}

impl Heartbeat {
    /// Create heartbeat state; the ack flag starts set so the first beat of
    /// a fresh connection is never mistaken for a miss.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            interval: Mutex::new(DEFAULT_INTERVAL),
            acked: Flag::new(true),
            reset: Flag::new(false),
            last_send: Mutex::new(now),
            last_ack: Mutex::new(now),
        }
    }

    /// Set the interval from the handshake; immutable until the next
    /// reconnect hands down a new HELLO.
    pub fn set_interval(&self, interval: Duration) {
        *self.interval.lock() = interval;
    }

    /// Current heartbeat interval
    pub fn interval(&self) -> Duration {
        *self.interval.lock()
    }

    /// Record an outbound frame send time
    pub fn record_send(&self) {
        *self.last_send.lock() = Instant::now();
    }

    /// Mark a heartbeat as sent and awaiting acknowledgement
    pub fn mark_pending(&self) {
        self.acked.clear();
    }

    /// Record a received HEARTBEAT_ACK
    pub fn ack(&self) {
        *self.last_ack.lock() = Instant::now();
        self.acked.set();
    }

    /// Whether the last heartbeat was acknowledged
    pub fn is_acked(&self) -> bool {
        self.acked.is_set()
    }

    /// Hard-restart bookkeeping before (re)spawning the loop
    pub fn prepare(&self) {
        self.reset.clear();
        self.acked.set();
    }

    /// Ask a running loop to stop at its next wait point
    pub fn request_reset(&self) {
        self.reset.set();
    }

    /// The reset signal the loop races its timer against
    pub fn reset_signal(&self) -> &Flag {
        &self.reset
    }

    /// Time between the last send and the last acknowledgement.
    ///
    /// Zero while an acknowledgement is outstanding.
    pub fn latency(&self) -> Duration {
        let last_send = *self.last_send.lock();
        let last_ack = *self.last_ack.lock();
        last_ack.saturating_duration_since(last_send)
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}
