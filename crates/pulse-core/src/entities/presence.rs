//! Presence entity - a user's online status and activities

use serde::{Deserialize, Serialize};

use super::user::User;
use crate::value_objects::Snowflake;

/// Online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusType {
    #[default]
    Online,
    Dnd,
    Idle,
    Invisible,
    Offline,
}

/// An activity shown under a user's presence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Presence state for a user, scoped to a guild on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activities: Vec<Activity>,
}

impl Presence {
    /// Build the client-side presence sent in IDENTIFY / PRESENCE_UPDATE
    #[must_use]
    pub fn new(status: StatusType) -> Self {
        Self {
            user: None,
            guild_id: None,
            status: Some(status),
            activities: Vec::new(),
        }
    }

    /// Attach an activity
    #[must_use]
    pub fn with_activity(mut self, name: impl Into<String>, kind: u8) -> Self {
        self.activities.push(Activity {
            name: name.into(),
            kind,
            url: None,
        });
        self
    }
}
