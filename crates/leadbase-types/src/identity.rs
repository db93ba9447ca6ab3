//! Identity types for Leadbase
//!
//! Users and activity entries are identified by UUIDs; workspaces use the
//! numeric `BIGINT` key of the `workspaces` table. All of them are wrapped
//! so a user id can never be passed where a workspace id is expected.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::TypesError;

/// Macro to generate UUID-backed ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse from a hyphenated or simple UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s.trim())?))
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
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

define_id_type!(UserId, "Identifier of an authenticated principal");
define_id_type!(ActivityLogId, "Identifier of a persisted activity entry, generated at insert time");

/// Identifier of a workspace (tenant boundary).
///
/// Serialized as a JSON number. Deserialization also accepts a numeric
/// string because browser clients carry the `BIGINT` key as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub i64);

impl WorkspaceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkspaceId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidWorkspaceId(s.to_string()))
    }
}

impl From<i64> for WorkspaceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for WorkspaceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// The principal performing an action, passed explicitly to every Logger
/// and Guard call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Actor {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Where a request came from, captured for the audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }

    /// Whether the user agent looks like a browser rather than a scripted
    /// HTTP client.
    pub fn is_browser(&self) -> bool {
        match &self.user_agent {
            Some(ua) => !ua.contains("node-fetch") && !ua.contains("axios"),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_id_accepts_number_and_string() {
        let from_number: WorkspaceId = serde_json::from_str("42").unwrap();
        let from_string: WorkspaceId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_number, WorkspaceId(42));
        assert_eq!(from_string, WorkspaceId(42));
        assert_eq!(serde_json::to_string(&from_string).unwrap(), "42");
    }

    #[test]
    fn test_workspace_id_rejects_non_numeric() {
        assert!(serde_json::from_str::<WorkspaceId>("\"abc\"").is_err());
        assert!("12x".parse::<WorkspaceId>().is_err());
    }

    #[test]
    fn test_user_id_display_is_plain_uuid() {
        let id = UserId::new();
        assert_eq!(id.to_string(), id.0.to_string());
        assert_eq!(UserId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_browser_detection() {
        let browser = RequestOrigin::new(None, Some("Mozilla/5.0".into()));
        let script = RequestOrigin::new(None, Some("node-fetch/1.0".into()));
        assert!(browser.is_browser());
        assert!(!script.is_browser());
        assert!(!RequestOrigin::default().is_browser());
    }
}
