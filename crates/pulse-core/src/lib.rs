//! # pulse-core
//!
//! Domain layer containing identifiers, the intents bitmask, and the wire
//! entities delivered by the gateway. This crate has zero dependencies on
//! infrastructure (transport, cache, HTTP, etc.).

pub mod entities;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Activity, Channel, ChannelType, Emoji, Guild, GuildMember, Message, Presence, ReadyData, Role,
    StatusType, User,
};
pub use value_objects::{Intents, Snowflake, SnowflakeParseError};
