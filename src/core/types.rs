//! Common types used across multiregion modules.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Identifier of one geographic deployment of a backend (e.g. `us-east-1`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Create a new region identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of a cloud account handled by the multi-account layer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_region_id_serializes_as_plain_string() {
        let region = RegionId::from("ap-south-1");
        assert_eq!(serde_json::to_string(&region).unwrap(), "\"ap-south-1\"");
    }

    #[test]
    fn test_region_map_is_json_object() {
        let mut map = BTreeMap::new();
        map.insert(RegionId::from("us-east-1"), 1);
        map.insert(RegionId::from("eu-west-1"), 2);

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"eu-west-1": 2, "us-east-1": 1}));
    }

    #[test]
    fn test_region_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(RegionId::from("us-west-2"), "vpc");
        assert_eq!(map.get("us-west-2"), Some(&"vpc"));
    }
}
