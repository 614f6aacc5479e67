//! # pulse-gateway
//!
//! Client session for a real-time push gateway: long-lived WebSocket
//! connection with identify/resume, heartbeat liveness, an outbound rate
//! budget, and reconciliation of dispatched events into the entity cache.

pub mod dispatch;
pub mod error;
pub mod events;
pub mod interactions;
pub mod protocol;
pub mod session;

pub use dispatch::{Dispatcher, EventPayload};
pub use error::GatewayError;
pub use events::EventReconciler;
pub use session::{GatewaySession, SessionConfig, SessionState};
