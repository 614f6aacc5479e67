//! Cache keys
//!
//! Most entities are keyed by a single Snowflake. Membership records have no
//! natural id of their own and are keyed by the {owner, member} pair.

use pulse_core::Snowflake;
use std::fmt;

/// Key identifying one cache entry within an entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Single-id entities (guilds, channels, messages, ...)
    Id(Snowflake),
    /// Composite-keyed entities, e.g. a member keyed by {guild id, user id}
    Pair(Snowflake, Snowflake),
}

impl CacheKey {
    /// Build a composite key for a membership-style record
    #[must_use]
    pub const fn pair(owner: Snowflake, member: Snowflake) -> Self {
        Self::Pair(owner, member)
    }
}

impl From<Snowflake> for CacheKey {
    fn from(id: Snowflake) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Pair(owner, member) => write!(f, "{owner}:{member}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality() {
        let a = CacheKey::from(Snowflake::new(1));
        let b = CacheKey::Id(Snowflake::new(1));
        assert_eq!(a, b);

        let p1 = CacheKey::pair(Snowflake::new(1), Snowflake::new(2));
        let p2 = CacheKey::pair(Snowflake::new(2), Snowflake::new(1));
        assert_ne!(p1, p2);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(CacheKey::Id(Snowflake::new(7)).to_string(), "7");
        assert_eq!(
            CacheKey::pair(Snowflake::new(1), Snowflake::new(2)).to_string(),
            "1:2"
        );
    }
}
