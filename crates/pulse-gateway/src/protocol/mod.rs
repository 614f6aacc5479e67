//! Gateway wire protocol
//!
//! Envelope format, operation codes, close-code policy, and the payload
//! structures exchanged during the session handshake.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::{close_code_description, CloseBehavior};
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, IdentifyProperties, ResumePayload};
