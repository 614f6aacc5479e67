//! READY payload - handshake-complete data sent after a successful identify

use serde::{Deserialize, Serialize};

use super::guild::Guild;
use super::user::User;

/// Contents of the READY dispatch event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyData {
    /// Gateway protocol version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    /// The authenticated user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Guilds visible to the session (possibly unavailable stubs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guilds: Vec<Guild>,
    /// Server-issued session identifier, required for RESUME
    pub session_id: String,
    /// Dedicated URL for resuming this session
    pub resume_gateway_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_decode() {
        let ready: ReadyData = serde_json::from_str(
            r#"{"v":10,"session_id":"abc","resume_gateway_url":"wss://resume.example","guilds":[{"id":"5"}]}"#,
        )
        .unwrap();
        assert_eq!(ready.session_id, "abc");
        assert_eq!(ready.resume_gateway_url, "wss://resume.example");
        assert_eq!(ready.guilds.len(), 1);
    }
}
