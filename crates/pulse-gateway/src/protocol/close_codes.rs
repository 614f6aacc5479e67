//! WebSocket close-code policy
//!
//! Classifies a received close code into the recovery behavior the session
//! must take.

/// What the session does after the transport closes with a given code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseBehavior {
    /// Start a fresh session (new IDENTIFY, new session id)
    Reidentify,
    /// Re-establish the connection and RESUME with the prior session id
    Resume,
    /// Surface the code to the caller as a session-fatal error
    Fatal,
}

impl CloseBehavior {
    /// Classify a close code per the protocol contract:
    /// codes in the 4000+ application range are fatal, a clean close (1000)
    /// starts a fresh session, and everything else resumes.
    #[must_use]
    pub fn classify(code: u16) -> Self {
        match code {
            1000 => Self::Reidentify,
            // 4001 is suppressed: the service emits it spuriously after some
            // presence updates even though the payload is accepted. Candidate
            // for removal once the upstream cause is fixed. Not generalized
            // to any other code.
            4001 => Self::Resume,
            code if code >= 4000 => Self::Fatal,
            _ => Self::Resume,
        }
    }

    /// Whether this behavior keeps the prior session identity
    #[must_use]
    pub const fn is_resumable(self) -> bool {
        matches!(self, Self::Resume)
    }
}

/// Human-readable description for known application close codes
#[must_use]
pub fn close_code_description(code: u16) -> Option<&'static str> {
    match code {
        1000 => Some("Clean close"),
        4000 => Some("Unknown error"),
        4001 => Some("Unknown opcode"),
        4002 => Some("Decode error"),
        4003 => Some("Not authenticated"),
        4004 => Some("Authentication failed"),
        4005 => Some("Already authenticated"),
        4007 => Some("Invalid sequence"),
        4008 => Some("Rate limited"),
        4009 => Some("Session timed out"),
        4010 => Some("Invalid shard"),
        4011 => Some("Sharding required"),
        4012 => Some("Invalid API version"),
        4013 => Some("Invalid intents"),
        4014 => Some("Disallowed intents"),
        _ => None,
    }
}
