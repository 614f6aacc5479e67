//! Session construction parameters

use pulse_common::ClientConfig;
use pulse_core::{Intents, Presence};

use crate::protocol::{IdentifyPayload, IdentifyProperties};

/// Configuration supplied at session construction
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Authentication token
    pub token: String,
    /// Event categories the client wishes to receive
    pub intents: Intents,
    /// Optional shard pair (shard id, shard count)
    pub shard: Option<(u32, u32)>,
    /// Optional initial presence
    pub presence: Option<Presence>,
}

impl SessionConfig {
    /// Create a configuration with token and intents
    #[must_use]
    pub fn new(token: impl Into<String>, intents: Intents) -> Self {
        Self {
            token: token.into(),
            intents,
            shard: None,
            presence: None,
        }
    }

    /// Identify under a specific shard
    #[must_use]
    pub fn with_shard(mut self, shard_id: u32, shard_count: u32) -> Self {
        self.shard = Some((shard_id, shard_count));
        self
    }

    /// Set the initial presence sent with IDENTIFY
    #[must_use]
    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Build the IDENTIFY payload for this configuration
    pub(crate) fn identify_payload(&self, presence: Option<Presence>) -> IdentifyPayload {
        IdentifyPayload {
            token: self.token.clone(),
            intents: self.intents,
            properties: IdentifyProperties::default(),
            shard: self.shard,
            presence,
        }
    }
}

impl From<&ClientConfig> for SessionConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            token: config.token.clone(),
            intents: config.intents,
            shard: config.shard,
            presence: None,
        }
    }
}
