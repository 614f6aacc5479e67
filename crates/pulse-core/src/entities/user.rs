//! User entity

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A user account as delivered by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot: Option<bool>,
}

impl User {
    /// Display name (global name if set, otherwise username)
    pub fn display_name(&self) -> &str {
        self.global_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or_default()
    }

    /// Whether this user is a bot account
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.bot.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_decode_partial() {
        let user: User = serde_json::from_str(r#"{"id":"42"}"#).unwrap();
        assert_eq!(user.id, Snowflake::new(42));
        assert!(user.username.is_none());
        assert!(!user.is_bot());
    }

    #[test]
    fn test_display_name_prefers_global_name() {
        let user: User = serde_json::from_str(
            r#"{"id":"1","username":"blob","global_name":"Blob the Great"}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), "Blob the Great");
    }
}
