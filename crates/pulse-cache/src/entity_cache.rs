//! Aggregated entity cache
//!
//! One typed store per cached entity kind. Members are keyed by
//! `CacheKey::Pair(guild_id, user_id)`; everything else by its own id.

use crate::store::Store;
use pulse_core::{Channel, Guild, GuildMember, Message, Presence, Role, User};

/// Process-wide entity cache
///
/// Shared as `Arc<EntityCache>` between the session and consumers. The event
/// reconciler is the only writer; consumers read clones of entries and never
/// mutate the cache.
#[derive(Debug, Default)]
pub struct EntityCache {
    pub guilds: Store<Guild>,
    pub channels: Store<Channel>,
    pub messages: Store<Message>,
    pub users: Store<User>,
    pub members: Store<GuildMember>,
    pub roles: Store<Role>,
    pub presences: Store<Presence>,
}

impl EntityCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of cached entries across all entity types
    pub fn len(&self) -> usize {
        self.guilds.len()
            + self.channels.len()
            + self.messages.len()
            + self.users.len()
            + self.members.len()
            + self.roles.len()
            + self.presences.len()
    }

    /// Whether every store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
