//! Gateway session
//!
//! Connection lifecycle state machine, heartbeat liveness, outbound rate
//! budget, and the steady receive loop.

mod config;
mod heartbeat;
mod ratelimit;
mod session;
mod signal;

pub use config::SessionConfig;
pub use heartbeat::Heartbeat;
pub use ratelimit::RateLimiter;
pub use session::{GatewaySession, SessionState};
pub use signal::Flag;
