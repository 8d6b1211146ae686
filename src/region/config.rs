//! Prober and dispatch configuration.

use crate::core::{Error, Result};
use crate::monitoring::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How regional calls are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One region after another, in region order
    #[default]
    Sequential,
    /// All regions at once, joined before returning
    Concurrent,
}

/// Whole milliseconds for a timeout, never zero.
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Dispatch proxy configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Scheduling of regional calls
    pub execution: ExecutionMode,
    /// Per-region call timeout, disabled when `None`
    pub call_timeout_ms: Option<u64>,
    /// Require every regional client to advertise the same operation set
    pub validate_operation_sets: bool,
}

impl DispatchConfig {
    /// Sequential dispatch, as the reference client does it.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Concurrent dispatch.
    pub fn concurrent() -> Self {
        Self {
            execution: ExecutionMode::Concurrent,
            ..Default::default()
        }
    }

    /// Set per-region call timeout. Sub-millisecond values round up to 1ms.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = Some(timeout_millis(timeout));
        self
    }

    /// Skip operation-set validation at construction.
    pub fn without_validation(mut self) -> Self {
        self.validate_operation_sets = false;
        self
    }

    /// Configured call timeout.
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionMode::Sequential,
            call_timeout_ms: None,
            validate_operation_sets: true,
        }
    }
}

/// Region prober configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Service used for the identity check
    pub identity_service: String,
    /// Operation used for the identity check
    pub identity_operation: String,
    /// Error codes meaning "credential not valid in this region"
    pub unavailable_codes: Vec<String>,
    /// Scheduling of identity checks
    pub execution: ExecutionMode,
    /// Per-region identity check timeout, disabled when `None`
    pub call_timeout_ms: Option<u64>,
}

impl ProbeConfig {
    /// Treat an additional error code as "region unavailable".
    pub fn with_unavailable_code(mut self, code: &str) -> Self {
        self.unavailable_codes.push(code.to_string());
        self
    }

    /// Set execution mode.
    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Set per-region identity check timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = Some(timeout_millis(timeout));
        self
    }

    /// Check if an error code marks the region as unavailable.
    pub fn is_unavailable_code(&self, code: &str) -> bool {
        self.unavailable_codes.iter().any(|c| c == code)
    }

    /// Configured call timeout.
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            identity_service: "sts".to_string(),
            identity_operation: "get_caller_identity".to_string(),
            unavailable_codes: vec!["InvalidClientTokenId".to_string()],
            execution: ExecutionMode::Sequential,
            call_timeout_ms: None,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiRegionConfig {
    /// Dispatch proxy settings
    pub dispatch: DispatchConfig,
    /// Region prober settings
    pub probe: ProbeConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl MultiRegionConfig {
    /// Parse configuration from a JSON document. Missing fields use defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.probe.identity_service.is_empty() || self.probe.identity_operation.is_empty() {
            return Err(Error::Config(
                "probe identity service and operation must be set".to_string(),
            ));
        }
        if self.dispatch.call_timeout_ms == Some(0) || self.probe.call_timeout_ms == Some(0) {
            return Err(Error::Config("call timeout must be positive".to_string()));
        }
        Ok(())
    }
}
