//! Identity types for YeetCode
//!
//! Generated ids are strongly typed wrappers around UUIDs so a duel id can
//! never be passed where a notification id is expected. Usernames are the
//! external (LeetCode) handles and compare case-insensitively.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::TypeError;

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id_type!(DuelId, "duel", "Unique identifier for a 1-on-1 duel");
define_id_type!(NotificationId, "notif", "Unique identifier for a transient leaderboard notification");

/// A member's handle on the problem site.
///
/// Always stored lowercase; `Alice` and `alice` are the same member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Normalize and validate a username
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidUsername(raw.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl std::str::FromStr for Username {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duel_id_prefix() {
        let id = DuelId::new();
        assert!(id.to_string().starts_with("duel_"));
    }

    #[test]
    fn test_id_parsing() {
        let id = DuelId::new();
        let parsed = DuelId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_username_is_case_insensitive() {
        let a = Username::new("  Alice ").unwrap();
        let b = Username::new("alice").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "alice");
    }

    #[test]
    fn test_blank_username_rejected() {
        assert!(Username::new("   ").is_err());
        assert!(serde_json::from_str::<Username>("\"\"").is_err());
    }
}
