//! Decoded entity union handed to event handlers

use pulse_core::{Channel, Guild, GuildMember, Message, Presence, Role, Snowflake, User};

/// A decoded domain entity of any cached kind
#[derive(Debug, Clone)]
pub enum Entity {
    Guild(Box<Guild>),
    Channel(Box<Channel>),
    Message(Box<Message>),
    User(Box<User>),
    Member(Box<GuildMember>),
    Role(Box<Role>),
    Presence(Box<Presence>),
}

impl Entity {
    /// The entity's own identifier, when it has one
    pub fn id(&self) -> Option<Snowflake> {
        match self {
            Self::Guild(g) => Some(g.id),
            Self::Channel(c) => Some(c.id),
            Self::Message(m) => Some(m.id),
            Self::User(u) => Some(u.id),
            Self::Member(m) => m.user_id(),
            Self::Role(r) => Some(r.id),
            Self::Presence(p) => p.user.as_ref().map(|u| u.id),
        }
    }
}
