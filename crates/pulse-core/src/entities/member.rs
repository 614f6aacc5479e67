//! Member entity - represents a user's membership in a guild
//!
//! Membership records have no single natural id: they are keyed by the pair
//! {guild id, user id}.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;
use crate::value_objects::Snowflake;

/// Guild member entity (junction between User and Guild)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaf: Option<bool>,
}

impl GuildMember {
    /// The member's user id, if the payload carried a user object
    #[inline]
    pub fn user_id(&self) -> Option<Snowflake> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Display name (nickname if set, otherwise the user's display name)
    pub fn display_name(&self) -> &str {
        if let Some(nick) = self.nick.as_deref() {
            return nick;
        }
        self.user.as_ref().map_or("", User::display_name)
    }

    /// Check if the member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(&role_id)
    }
}
