//! Event routing table
//!
//! A finite mapping from event name to decode/cache policy, resolved once at
//! startup. Event names never drive runtime name lookup.

use std::collections::HashMap;

/// Which entity type an event decodes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Guild,
    Channel,
    /// Threads are channels cached in the guild's thread list
    Thread,
    Message,
    User,
    Member,
    Role,
    Presence,
}

/// Cache mutation policy for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Decode and insert, then append to the owning guild list
    Create,
    /// Field-level merge producing before/after snapshots
    Update,
    /// Evict from cache and the owning guild list
    Delete,
    /// Never cached; forwarded to handlers as raw payload
    Forward,
}

/// How the cache key is derived from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// The payload's own `id` field
    Primary,
    /// Composite {guild_id, user.id} key (membership records)
    GuildUserPair,
    /// The id of a nested object, e.g. `role.id`
    Nested(&'static str),
    /// An adjacent `<name>_id` field, e.g. `role_id`
    Adjacent(&'static str),
    /// No identifier is derivable
    None,
}

/// Which guild sub-collection mirrors this event's entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuildList {
    Channels,
    Threads,
    Roles,
    Members,
    /// Not tracked as a list on the guild
    Skip,
}

/// Routing entry for one event name
#[derive(Debug, Clone, Copy)]
pub struct EventRoute {
    pub kind: EntityKind,
    pub action: Action,
    pub id: IdStrategy,
    pub guild_list: GuildList,
}

impl EventRoute {
    const fn new(kind: EntityKind, action: Action, id: IdStrategy, guild_list: GuildList) -> Self {
        Self {
            kind,
            action,
            id,
            guild_list,
        }
    }
}

/// Startup-built mapping from event name to route
#[derive(Debug)]
pub struct EventRegistry {
    routes: HashMap<&'static str, EventRoute>,
}

impl EventRegistry {
    /// Build the full routing table
    #[must_use]
    pub fn new() -> Self {
        use Action::{Create, Delete, Forward, Update};
        use EntityKind::{Channel, Guild, Member, Message, Presence, Role, Thread, User};
        use GuildList::Skip;
        use IdStrategy::{Adjacent, GuildUserPair, Nested, Primary};

        let mut routes = HashMap::new();
        let mut add = |name: &'static str, route: EventRoute| {
            routes.insert(name, route);
        };

        add("GUILD_CREATE", EventRoute::new(Guild, Create, Primary, Skip));
        add("GUILD_UPDATE", EventRoute::new(Guild, Update, Primary, Skip));
        add("GUILD_DELETE", EventRoute::new(Guild, Delete, Primary, Skip));

        add("CHANNEL_CREATE", EventRoute::new(Channel, Create, Primary, GuildList::Channels));
        add("CHANNEL_UPDATE", EventRoute::new(Channel, Update, Primary, GuildList::Channels));
        add("CHANNEL_DELETE", EventRoute::new(Channel, Delete, Primary, GuildList::Channels));
        // Pin markers carry no cacheable entity
        add("CHANNEL_PINS_UPDATE", EventRoute::new(Channel, Forward, IdStrategy::None, Skip));

        add("THREAD_CREATE", EventRoute::new(Thread, Create, Primary, GuildList::Threads));
        add("THREAD_UPDATE", EventRoute::new(Thread, Update, Primary, GuildList::Threads));
        add("THREAD_DELETE", EventRoute::new(Thread, Delete, Primary, GuildList::Threads));
        // Thread-membership roll-ups are not tracked as a guild list
        add("THREAD_MEMBERS_UPDATE", EventRoute::new(Thread, Forward, IdStrategy::None, Skip));

        add("MESSAGE_CREATE", EventRoute::new(Message, Create, Primary, Skip));
        add("MESSAGE_UPDATE", EventRoute::new(Message, Update, Primary, Skip));
        add("MESSAGE_DELETE", EventRoute::new(Message, Delete, Primary, Skip));
        add("MESSAGE_DELETE_BULK", EventRoute::new(Message, Forward, IdStrategy::None, Skip));
        add("MESSAGE_REACTION_ADD", EventRoute::new(Message, Forward, IdStrategy::None, Skip));
        add("MESSAGE_REACTION_REMOVE", EventRoute::new(Message, Forward, IdStrategy::None, Skip));
        add("MESSAGE_REACTION_REMOVE_ALL", EventRoute::new(Message, Forward, IdStrategy::None, Skip));
        add("MESSAGE_REACTION_REMOVE_EMOJI", EventRoute::new(Message, Forward, IdStrategy::None, Skip));

        add("GUILD_MEMBER_ADD", EventRoute::new(Member, Create, GuildUserPair, GuildList::Members));
        add("GUILD_MEMBER_UPDATE", EventRoute::new(Member, Update, GuildUserPair, GuildList::Members));
        add("GUILD_MEMBER_REMOVE", EventRoute::new(Member, Delete, GuildUserPair, GuildList::Members));

        add("GUILD_ROLE_CREATE", EventRoute::new(Role, Create, Nested("role"), GuildList::Roles));
        add("GUILD_ROLE_UPDATE", EventRoute::new(Role, Update, Nested("role"), GuildList::Roles));
        add("GUILD_ROLE_DELETE", EventRoute::new(Role, Delete, Adjacent("role_id"), GuildList::Roles));

        add("GUILD_BAN_ADD", EventRoute::new(User, Forward, IdStrategy::None, Skip));
        add("GUILD_BAN_REMOVE", EventRoute::new(User, Forward, IdStrategy::None, Skip));
        add("INVITE_CREATE", EventRoute::new(Guild, Forward, IdStrategy::None, Skip));
        add("INVITE_DELETE", EventRoute::new(Guild, Forward, IdStrategy::None, Skip));
        add("GUILD_SCHEDULED_EVENT_USER_ADD", EventRoute::new(User, Forward, IdStrategy::None, Skip));
        add("GUILD_SCHEDULED_EVENT_USER_REMOVE", EventRoute::new(User, Forward, IdStrategy::None, Skip));

        add("PRESENCE_UPDATE", EventRoute::new(Presence, Update, Nested("user"), Skip));
        add("USER_UPDATE", EventRoute::new(User, Update, Primary, Skip));

        // Forwarded without model decoding
        add("TYPING_START", EventRoute::new(User, Forward, IdStrategy::None, Skip));
        add("VOICE_STATE_UPDATE", EventRoute::new(User, Forward, IdStrategy::None, Skip));
        add("VOICE_SERVER_UPDATE", EventRoute::new(User, Forward, IdStrategy::None, Skip));

        Self { routes }
    }

    /// Look up the route for an event name
    pub fn route(&self, name: &str) -> Option<&EventRoute> {
        self.routes.get(name)
    }

    /// Number of routed event names
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty (never, after construction)
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
