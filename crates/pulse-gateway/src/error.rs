//! Gateway error types

use thiserror::Error;

/// Gateway session error type
///
/// Transient failures (resumable closes, missed heartbeat acks) are handled
/// inside the session and never surface here; these variants are the fatal
/// taxonomy.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The service closed the connection with an application-level error code
    #[error("Gateway closed the connection with code {code}: {reason}")]
    CloseCode { code: u16, reason: String },

    /// The handshake did not complete (wrong first frame, or a forced close
    /// while blocking on a handshake read)
    #[error("Gateway handshake failed: {0}")]
    HandshakeFailure(String),

    /// Transport-level failure
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Gateway URL resolution failed
    #[error("REST error: {0}")]
    Rest(#[from] pulse_rest::RestError),

    /// A frame failed to decode as a gateway envelope
    #[error("Envelope decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// A send was attempted without a usable connection
    #[error("Not connected to the gateway")]
    NotConnected,
}

impl GatewayError {
    /// Build a close-code error, substituting the protocol description when
    /// the server sent no reason text.
    #[must_use]
    pub fn close_code(code: u16, reason: String) -> Self {
        let reason = if reason.is_empty() {
            crate::protocol::close_code_description(code)
                .unwrap_or("unknown close code")
                .to_string()
        } else {
            reason
        };
        Self::CloseCode { code, reason }
    }
}
