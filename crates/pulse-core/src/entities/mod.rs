//! Wire entities delivered by the gateway
//!
//! Most non-identifier fields are optional so that partial update payloads
//! decode without loss.

mod channel;
mod guild;
mod member;
mod message;
mod presence;
mod ready;
mod role;
mod user;

pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use member::GuildMember;
pub use message::{Emoji, Message};
pub use presence::{Activity, Presence, StatusType};
pub use ready::ReadyData;
pub use role::Role;
pub use user::User;
