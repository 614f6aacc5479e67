//! Command option tree
//!
//! Options arrive as a nested array mixing plain values, sub-commands, and
//! sub-command groups. They are normalized at the decode boundary into one
//! tagged representation; focused-field lookup is a single recursive
//! traversal over it.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Wire option types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

impl OptionType {
    /// Create an `OptionType` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SubCommand),
            2 => Some(Self::SubCommandGroup),
            3 => Some(Self::String),
            4 => Some(Self::Integer),
            5 => Some(Self::Boolean),
            6 => Some(Self::User),
            7 => Some(Self::Channel),
            8 => Some(Self::Role),
            9 => Some(Self::Mentionable),
            10 => Some(Self::Number),
            11 => Some(Self::Attachment),
            _ => None,
        }
    }

    /// Whether values of this type refer to an entity in the resolved bundle
    #[must_use]
    pub const fn is_entity(self) -> bool {
        matches!(
            self,
            Self::User | Self::Channel | Self::Role | Self::Mentionable | Self::Attachment
        )
    }
}

impl<'de> Deserialize<'de> for OptionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid option type: {value}")))
    }
}

/// A leaf option carrying a concrete value
#[derive(Debug, Clone, PartialEq)]
pub struct ValueOption {
    pub name: String,
    pub kind: OptionType,
    pub value: Option<Value>,
    pub focused: bool,
}

/// One node of the option tree
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOption {
    /// A concrete value
    Value(ValueOption),
    /// A sub-command holding its own options
    SubCommand {
        name: String,
        options: Vec<CommandOption>,
    },
    /// A group holding sub-commands
    SubCommandGroup {
        name: String,
        options: Vec<CommandOption>,
    },
}

impl CommandOption {
    /// Node name, regardless of variant
    pub fn name(&self) -> &str {
        match self {
            Self::Value(v) => &v.name,
            Self::SubCommand { name, .. } | Self::SubCommandGroup { name, .. } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOption {
    name: String,
    #[serde(rename = "type")]
    kind: OptionType,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    focused: bool,
}

impl From<RawOption> for CommandOption {
    fn from(raw: RawOption) -> Self {
        match raw.kind {
            OptionType::SubCommand => Self::SubCommand {
                name: raw.name,
                options: raw.options.into_iter().map(Self::from).collect(),
            },
            OptionType::SubCommandGroup => Self::SubCommandGroup {
                name: raw.name,
                options: raw.options.into_iter().map(Self::from).collect(),
            },
            kind => Self::Value(ValueOption {
                name: raw.name,
                kind,
                value: raw.value,
                focused: raw.focused,
            }),
        }
    }
}

impl<'de> Deserialize<'de> for CommandOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawOption::deserialize(deserializer).map(Self::from)
    }
}

/// Find the currently focused value option, descending through sub-commands
/// and groups.
pub fn find_focused(options: &[CommandOption]) -> Option<&ValueOption> {
    for option in options {
        match option {
            CommandOption::Value(value) if value.focused => return Some(value),
            CommandOption::Value(_) => {}
            CommandOption::SubCommand { options, .. }
            | CommandOption::SubCommandGroup { options, .. } => {
                if let Some(found) = find_focused(options) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Collect the invoked sub-command path (group name, then sub-command name)
pub fn sub_command_path(options: &[CommandOption]) -> Vec<&str> {
    let mut path = Vec::new();
    let mut current = options;
    loop {
        let nested = current.iter().find_map(|option| match option {
            CommandOption::SubCommand { name, options }
            | CommandOption::SubCommandGroup { name, options } => Some((name.as_str(), options)),
            CommandOption::Value(_) => None,
        });
        match nested {
            Some((name, options)) => {
                path.push(name);
                current = options;
            }
            None => return path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Vec<CommandOption> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_value_option() {
        let options = decode(json!([{"name": "query", "type": 3, "value": "hi"}]));
        match &options[0] {
            CommandOption::Value(v) => {
                assert_eq!(v.name, "query");
                assert_eq!(v.kind, OptionType::String);
                assert_eq!(v.value, Some(json!("hi")));
                assert!(!v.focused);
            }
            other => panic!("expected value option, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_nested_tree() {
        let options = decode(json!([{
            "name": "admin",
            "type": 2,
            "options": [{
                "name": "ban",
                "type": 1,
                "options": [{"name": "user", "type": 6, "value": "42"}]
            }]
        }]));

        assert_eq!(sub_command_path(&options), vec!["admin", "ban"]);
    }

    #[test]
    fn test_find_focused_at_top_level() {
        let options = decode(json!([
            {"name": "a", "type": 3, "value": "x"},
            {"name": "b", "type": 3, "value": "y", "focused": true}
        ]));
        assert_eq!(find_focused(&options).unwrap().name, "b");
    }

    #[test]
    fn test_find_focused_inside_group() {
        let options = decode(json!([{
            "name": "group",
            "type": 2,
            "options": [{
                "name": "sub",
                "type": 1,
                "options": [{"name": "deep", "type": 4, "value": 7, "focused": true}]
            }]
        }]));
        assert_eq!(find_focused(&options).unwrap().name, "deep");
    }

    #[test]
    fn test_find_focused_none() {
        let options = decode(json!([{"name": "a", "type": 3, "value": "x"}]));
        assert!(find_focused(&options).is_none());
    }

    #[test]
    fn test_invalid_option_type_rejected() {
        let result: Result<CommandOption, _> =
            serde_json::from_value(json!({"name": "a", "type": 99}));
        assert!(result.is_err());
    }

    #[test]
    fn test_entity_option_types() {
        assert!(OptionType::User.is_entity());
        assert!(OptionType::Mentionable.is_entity());
        assert!(!OptionType::String.is_entity());
        assert!(!OptionType::SubCommand.is_entity());
    }
}
