//! Guild entity - a server, carrying cached sub-collections of its children
//!
//! The sub-collection lists (`channels`, `threads`, `roles`, `members`) are
//! maintained by the event reconciler: each child create/update/delete is
//! mirrored into the owning guild's list exactly once, keyed by child id.

use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::member::GuildMember;
use super::role::Role;
use crate::value_objects::Snowflake;

/// Guild (server) entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Channel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub threads: Vec<Channel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<GuildMember>,
}

impl Guild {
    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Insert or replace a channel in the cached channel list, keyed by id
    pub fn upsert_channel(&mut self, channel: Channel) {
        Self::upsert_by_key(&mut self.channels, channel, |c| c.id);
    }

    /// Remove a channel from the cached channel list
    pub fn remove_channel(&mut self, channel_id: Snowflake) {
        self.channels.retain(|c| c.id != channel_id);
    }

    /// Insert or replace a thread in the cached thread list, keyed by id
    pub fn upsert_thread(&mut self, thread: Channel) {
        Self::upsert_by_key(&mut self.threads, thread, |c| c.id);
    }

    /// Remove a thread from the cached thread list
    pub fn remove_thread(&mut self, thread_id: Snowflake) {
        self.threads.retain(|c| c.id != thread_id);
    }

    /// Insert or replace a role in the cached role list, keyed by id
    pub fn upsert_role(&mut self, role: Role) {
        Self::upsert_by_key(&mut self.roles, role, |r| r.id);
    }

    /// Remove a role from the cached role list
    pub fn remove_role(&mut self, role_id: Snowflake) {
        self.roles.retain(|r| r.id != role_id);
    }

    /// Insert or replace a member in the cached member list, keyed by user id
    ///
    /// Members without a user object cannot be keyed and are ignored.
    pub fn upsert_member(&mut self, member: GuildMember) {
        let Some(user_id) = member.user_id() else {
            return;
        };
        if let Some(existing) = self
            .members
            .iter_mut()
            .find(|m| m.user_id() == Some(user_id))
        {
            *existing = member;
        } else {
            self.members.push(member);
        }
    }

    /// Remove a member from the cached member list
    pub fn remove_member(&mut self, user_id: Snowflake) {
        self.members.retain(|m| m.user_id() != Some(user_id));
    }

    fn upsert_by_key<T>(list: &mut Vec<T>, item: T, key: impl Fn(&T) -> Snowflake) {
        let id = key(&item);
        if let Some(existing) = list.iter_mut().find(|e| key(e) == id) {
            *existing = item;
        } else {
            list.push(item);
        }
    }
}
