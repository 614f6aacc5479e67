//! Gateway intents bitmask
//!
//! Declares which event categories the client wishes to receive. Sent as an
//! integer in the IDENTIFY payload.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Gateway intent flags
    ///
    /// Serialized as a plain integer on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Intents: u64 {
        /// Guild create/update/delete, roles, channels, threads
        const GUILDS                    = 1 << 0;
        /// Member add/update/remove (privileged)
        const GUILD_MEMBERS             = 1 << 1;
        /// Bans and moderation events
        const GUILD_MODERATION          = 1 << 2;
        /// Emoji and sticker updates
        const GUILD_EXPRESSIONS         = 1 << 3;
        /// Guild integrations
        const GUILD_INTEGRATIONS        = 1 << 4;
        /// Webhook updates
        const GUILD_WEBHOOKS            = 1 << 5;
        /// Invite create/delete
        const GUILD_INVITES             = 1 << 6;
        /// Voice state updates
        const GUILD_VOICE_STATES        = 1 << 7;
        /// Presence updates (privileged)
        const GUILD_PRESENCES           = 1 << 8;
        /// Guild message create/update/delete
        const GUILD_MESSAGES            = 1 << 9;
        /// Guild message reactions
        const GUILD_MESSAGE_REACTIONS   = 1 << 10;
        /// Guild typing notifications
        const GUILD_MESSAGE_TYPING      = 1 << 11;
        /// Direct message create/update/delete
        const DIRECT_MESSAGES           = 1 << 12;
        /// Direct message reactions
        const DIRECT_MESSAGE_REACTIONS  = 1 << 13;
        /// Direct message typing notifications
        const DIRECT_MESSAGE_TYPING     = 1 << 14;
        /// Message content payloads (privileged)
        const MESSAGE_CONTENT           = 1 << 15;
        /// Scheduled event create/update/delete and user add/remove
        const GUILD_SCHEDULED_EVENTS    = 1 << 16;
    }
}

impl Intents {
    /// All intents that do not require privileged approval
    #[must_use]
    pub fn non_privileged() -> Self {
        Self::all() - Self::GUILD_MEMBERS - Self::GUILD_PRESENCES - Self::MESSAGE_CONTENT
    }

    /// Check whether any privileged intent is requested
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.intersects(Self::GUILD_MEMBERS | Self::GUILD_PRESENCES | Self::MESSAGE_CONTENT)
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
