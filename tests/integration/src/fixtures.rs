//! Test fixtures and payload builders
//!
//! Reusable frame payloads for driving the mock gateway.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// HELLO frame with the given heartbeat interval
pub fn hello_frame(heartbeat_interval_ms: u64) -> String {
    json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval_ms}}).to_string()
}

/// HEARTBEAT_ACK frame
pub fn heartbeat_ack_frame() -> String {
    json!({"op": 11}).to_string()
}

/// Dispatch frame
pub fn dispatch_frame(event: &str, seq: u64, data: Value) -> String {
    json!({"op": 0, "t": event, "s": seq, "d": data}).to_string()
}

/// READY payload pointing resume traffic back at the given URL
pub fn ready_data(session_id: &str, resume_url: &str) -> Value {
    json!({
        "v": 10,
        "session_id": session_id,
        "resume_gateway_url": resume_url,
        "user": {"id": "1", "username": "test-bot"},
    })
}

/// A guild payload
pub fn guild_data(id: u64) -> Value {
    json!({"id": id.to_string(), "name": format!("guild-{id}")})
}

/// A channel payload under a guild
pub fn channel_data(id: u64, guild_id: u64, name: &str) -> Value {
    json!({
        "id": id.to_string(),
        "type": 0,
        "guild_id": guild_id.to_string(),
        "name": name,
    })
}

/// A message payload
pub fn message_data(id: u64, channel_id: u64) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": channel_id.to_string(),
        "content": format!("message-{id}"),
    })
}
