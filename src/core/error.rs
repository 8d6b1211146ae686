//! Error types for multi-region dispatch.

use crate::core::types::{AccountId, RegionId};
use thiserror::Error;

/// Result type alias for multi-region operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing or dispatching across regions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Construction errors
    #[error("Region set is empty")]
    EmptyRegionSet,

    #[error("Failed to build client for region {region}: {reason}")]
    ClientConstruction { region: RegionId, reason: String },

    #[error("Operation set of region {region} differs (missing: {missing:?}, extra: {extra:?})")]
    OperationSetMismatch {
        region: RegionId,
        missing: Vec<String>,
        extra: Vec<String>,
    },

    // Dispatch errors
    #[error("MultiRegionClient object has no attribute {name}")]
    UnknownOperation { name: String },

    #[error("Remote call failed in region {region}: {code}: {message}")]
    Remote {
        region: RegionId,
        code: String,
        message: String,
    },

    #[error("Operation {operation} timed out in region {region} after {after_ms}ms")]
    Timeout {
        region: RegionId,
        operation: String,
        after_ms: u64,
    },

    #[error("Failed to list regions for service {service}: {code}: {message}")]
    RegionDiscovery {
        service: String,
        code: String,
        message: String,
    },

    #[error("Unexpected response envelope from region {region}: {reason}")]
    EnvelopeShape { region: RegionId, reason: String },

    // Account errors
    #[error("Account {account} failed: {reason}")]
    Account { account: AccountId, reason: String },

    // Generic errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classification token for this error.
    ///
    /// Remote failures report the code returned by the backend; every other
    /// variant has a fixed token.
    pub fn code(&self) -> &str {
        match self {
            Error::EmptyRegionSet => "EmptyRegionSet",
            Error::ClientConstruction { .. } => "ClientConstruction",
            Error::OperationSetMismatch { .. } => "OperationSetMismatch",
            Error::UnknownOperation { .. } => "UnknownOperation",
            Error::Remote { code, .. } | Error::RegionDiscovery { code, .. } => code,
            Error::Timeout { .. } => "Timeout",
            Error::EnvelopeShape { .. } => "EnvelopeShape",
            Error::Account { .. } => "Account",
            Error::Config(_) => "Config",
            Error::Serialization(_) => "Serialization",
            Error::Internal(_) => "Internal",
        }
    }

    /// Region the error originated from, if any.
    pub fn region(&self) -> Option<&RegionId> {
        match self {
            Error::ClientConstruction { region, .. }
            | Error::OperationSetMismatch { region, .. }
            | Error::Remote { region, .. }
            | Error::Timeout { region, .. }
            | Error::EnvelopeShape { region, .. } => Some(region),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_code_passthrough() {
        let err = Error::Remote {
            region: RegionId::from("eu-west-1"),
            code: "Throttling".to_string(),
            message: "Rate exceeded".to_string(),
        };
        assert_eq!(err.code(), "Throttling");
        assert_eq!(err.region().map(RegionId::as_str), Some("eu-west-1"));
    }

    #[test]
    fn test_unknown_operation_message() {
        let err = Error::UnknownOperation {
            name: "describe_nothing".to_string(),
        };
        assert_eq!(err.code(), "UnknownOperation");
        assert!(err.to_string().contains("has no attribute describe_nothing"));
        assert!(err.region().is_none());
    }

    #[test]
    fn test_from_serde_json() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: Error = parse.unwrap_err().into();
        assert_eq!(err.code(), "Serialization");
    }
}
