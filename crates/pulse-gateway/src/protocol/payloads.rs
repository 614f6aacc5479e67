//! Client payload definitions
//!
//! Payload structures for the handshake frames the client sends.

use pulse_core::{Intents, Presence};
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate a fresh session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authentication token
    pub token: String,

    /// Event categories the client wishes to receive
    pub intents: Intents,

    /// Client properties
    pub properties: IdentifyProperties,

    /// Optional shard pair (shard id, shard count)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard: Option<(u32, u32)>,

    /// Optional initial presence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,
}

/// Client connection properties sent in IDENTIFY
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    pub os: String,
    /// Library name reported as the browser
    pub browser: String,
    /// Library name reported as the device
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "pulse".to_string(),
            device: "pulse".to_string(),
        }
    }
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to re-attach to a prior session after a drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Authentication token
    pub token: String,
    /// Server-issued id of the session being resumed
    pub session_id: String,
    /// Last sequence number seen before the drop
    pub seq: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_roundtrip() {
        let hello: HelloPayload = serde_json::from_str(r#"{"heartbeat_interval":41250}"#).unwrap();
        assert_eq!(hello.heartbeat_interval, 41250);
    }

    #[test]
    fn test_identify_serialization_skips_absent_fields() {
        let payload = IdentifyPayload {
            token: "t".to_string(),
            intents: Intents::GUILDS,
            properties: IdentifyProperties::default(),
            shard: None,
            presence: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("shard").is_none());
        assert!(json.get("presence").is_none());
        assert_eq!(json["intents"], 1);
        assert_eq!(json["properties"]["browser"], "pulse");
    }

    #[test]
    fn test_identify_shard_serializes_as_array() {
        let payload = IdentifyPayload {
            token: "t".to_string(),
            intents: Intents::empty(),
            properties: IdentifyProperties::default(),
            shard: Some((0, 2)),
            presence: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["shard"], serde_json::json!([0, 2]));
    }

    #[test]
    fn test_resume_serialization() {
        let payload = ResumePayload {
            token: "t".to_string(),
            session_id: "abc".to_string(),
            seq: Some(42),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["seq"], 42);
    }
}
