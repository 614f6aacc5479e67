//! Interaction context
//!
//! Typed view over an INTERACTION_CREATE payload, with option values
//! resolvable against the interaction's resolved-entity bundle.

use super::options::{find_focused, sub_command_path, CommandOption, OptionType, ValueOption};
use pulse_core::{Channel, GuildMember, Role, Snowflake, User};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Interaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InteractionKind {
    /// Liveness check from the service; never dispatched
    Ping = 1,
    /// Slash command invocation
    ApplicationCommand = 2,
    /// Button / select component interaction
    MessageComponent = 3,
    /// Autocomplete request for a focused option
    Autocomplete = 4,
    /// Modal form submission
    ModalSubmit = 5,
}

impl InteractionKind {
    /// Create an `InteractionKind` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            3 => Some(Self::MessageComponent),
            4 => Some(Self::Autocomplete),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for InteractionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid interaction type: {value}")))
    }
}

/// Entities referenced by option values, keyed by id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvedData {
    #[serde(default)]
    pub users: HashMap<Snowflake, User>,
    #[serde(default)]
    pub members: HashMap<Snowflake, GuildMember>,
    #[serde(default)]
    pub channels: HashMap<Snowflake, Channel>,
    #[serde(default)]
    pub roles: HashMap<Snowflake, Role>,
    #[serde(default)]
    pub attachments: HashMap<Snowflake, Value>,
}

/// A resolved option value
#[derive(Debug, Clone)]
pub enum ResolvedValue {
    User(Box<User>),
    Member(Box<GuildMember>),
    Channel(Box<Channel>),
    Role(Box<Role>),
    Attachment(Value),
}

/// A modal field row
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentRow {
    #[serde(default)]
    pub components: Vec<ComponentField>,
}

/// A single submitted modal field
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentField {
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// The `data` object of an interaction payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
    #[serde(default)]
    pub components: Vec<ComponentRow>,
}

/// Typed context for one interaction
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionContext {
    pub id: Snowflake,
    #[serde(default)]
    pub application_id: Option<Snowflake>,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub member: Option<GuildMember>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
}

impl InteractionContext {
    /// The user who triggered the interaction (direct, or via the member)
    pub fn invoking_user(&self) -> Option<&User> {
        self.user
            .as_ref()
            .or_else(|| self.member.as_ref().and_then(|m| m.user.as_ref()))
    }

    /// Resolve an entity-typed option value against the resolved bundle.
    ///
    /// User and mentionable options prefer the member record when the
    /// interaction happened inside a guild.
    pub fn resolve_option(&self, option: &ValueOption) -> Option<ResolvedValue> {
        let resolved = self.data.as_ref()?.resolved.as_ref()?;
        let id = option
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(|s| Snowflake::parse(s).ok())?;

        match option.kind {
            OptionType::User => self.resolve_user(resolved, id),
            OptionType::Channel => resolved
                .channels
                .get(&id)
                .map(|c| ResolvedValue::Channel(Box::new(c.clone()))),
            OptionType::Role => resolved
                .roles
                .get(&id)
                .map(|r| ResolvedValue::Role(Box::new(r.clone()))),
            OptionType::Attachment => resolved
                .attachments
                .get(&id)
                .map(|a| ResolvedValue::Attachment(a.clone())),
            OptionType::Mentionable => resolved
                .roles
                .get(&id)
                .map(|r| ResolvedValue::Role(Box::new(r.clone())))
                .or_else(|| self.resolve_user(resolved, id)),
            _ => None,
        }
    }

    fn resolve_user(&self, resolved: &ResolvedData, id: Snowflake) -> Option<ResolvedValue> {
        if self.guild_id.is_some() {
            if let Some(member) = resolved.members.get(&id) {
                return Some(ResolvedValue::Member(Box::new(member.clone())));
            }
        }
        resolved
            .users
            .get(&id)
            .map(|u| ResolvedValue::User(Box::new(u.clone())))
    }

    /// Resolve every entity-typed value option in the tree, in order
    pub fn resolved_options(&self) -> Vec<(String, ResolvedValue)> {
        let Some(data) = self.data.as_ref() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        collect_values(&data.options, &mut |option| {
            if option.kind.is_entity() {
                if let Some(value) = self.resolve_option(option) {
                    out.push((option.name.clone(), value));
                }
            }
        });
        out
    }

    /// The dispatch name derived from this interaction, including any nested
    /// sub-command path (commands) or the focused field (autocomplete).
    pub fn dispatch_name(&self) -> Option<String> {
        let data = self.data.as_ref()?;
        match self.kind {
            InteractionKind::ApplicationCommand => {
                let mut name = format!("command_{}", data.name.as_deref()?);
                for part in sub_command_path(&data.options) {
                    name.push('_');
                    name.push_str(part);
                }
                Some(name)
            }
            InteractionKind::MessageComponent => {
                Some(format!("component_{}", data.custom_id.as_deref()?))
            }
            InteractionKind::Autocomplete => {
                let mut name = format!("autocomplete_{}", data.id?);
                if let Some(focused) = find_focused(&data.options) {
                    name.push('_');
                    name.push_str(&focused.name);
                }
                Some(name)
            }
            InteractionKind::ModalSubmit => {
                Some(format!("modal_{}", data.custom_id.as_deref()?))
            }
            InteractionKind::Ping => None,
        }
    }

    /// Values submitted through a modal, one per field row
    pub fn modal_values(&self) -> Vec<String> {
        let Some(data) = self.data.as_ref() else {
            return Vec::new();
        };
        data.components
            .iter()
            .filter_map(|row| row.components.first())
            .filter_map(|field| field.value.clone())
            .collect()
    }
}

fn collect_values<'a>(options: &'a [CommandOption], visit: &mut impl FnMut(&'a ValueOption)) {
    for option in options {
        match option {
            CommandOption::Value(value) => visit(value),
            CommandOption::SubCommand { options, .. }
            | CommandOption::SubCommandGroup { options, .. } => collect_values(options, visit),
        }
    }
}
