//! Binary signal for task coordination
//!
//! A settable flag tasks can await, in place of ad hoc boolean polling.
//! Mirrors the wait/set/clear shape of an async event.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// An awaitable boolean flag
#[derive(Debug, Default)]
pub struct Flag {
    state: AtomicBool,
    notify: Notify,
}

impl Flag {
    /// Create a flag in the given initial state
    #[must_use]
    pub fn new(initial: bool) -> Self {
        Self {
            state: AtomicBool::new(initial),
            notify: Notify::new(),
        }
    }

    /// Set the flag and wake every waiter
    pub fn set(&self) {
        self.state.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Clear the flag; waiters block until the next `set`
    pub fn clear(&self) {
        self.state.store(false, Ordering::SeqCst);
    }

    /// Current state
    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }

    /// Wait until the flag is set; returns immediately if it already is
    pub async fn wait(&self) {
        while !self.is_set() {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // register interest before the re-check so a concurrent `set`
            // cannot slip between the check and the await
            notified.as_mut().enable();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }
}
