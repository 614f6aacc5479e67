//! REST error types

use thiserror::Error;

/// REST collaborator error type
///
/// Failures here are session-fatal: without a gateway URL there is no
/// connection to establish.
#[derive(Debug, Error)]
pub enum RestError {
    /// Network-level failure (DNS, TLS, connect, timeout)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The token was rejected
    #[error("Authentication rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Any other non-success HTTP status
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },
}
