//! # pulse-rest
//!
//! The REST collaborator consumed by the gateway session. Only the gateway
//! URL resolution surface is implemented here; the full HTTP API lives
//! outside this workspace.

mod client;
mod error;

pub use client::{GatewayUrlProvider, RestClient};
pub use error::RestError;
