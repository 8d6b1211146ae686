//! Structured logging for multiregion.
//!
//! Installs a `tracing` subscriber configured from [`LoggingConfig`].
//! `RUST_LOG` takes precedence over the configured directives.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level
    Error = 4,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full single-line records
    #[default]
    Full,
    /// Abbreviated records
    Compact,
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for this crate
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Extra filter directives (e.g. `hyper=warn`)
    pub directives: Vec<String>,
    /// Include the module path of each event
    pub with_target: bool,
}

impl LoggingConfig {
    /// Set level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Add a filter directive.
    pub fn with_directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    /// Filter string built from level and directives.
    pub fn filter_string(&self) -> String {
        std::iter::once(format!("multiregion={}", self.level))
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Build the env filter, preferring `RUST_LOG` when set.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(self.filter_string())
            .map_err(|e| Error::Config(format!("invalid log filter: {}", e)))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Full,
            directives: Vec::new(),
            with_target: true,
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Returns `Ok(false)` when a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = match config.format {
        LogFormat::Full => builder.try_init().is_ok(),
        LogFormat::Compact => builder.compact().try_init().is_ok(),
    };
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_string() {
        let config = LoggingConfig::default()
            .with_level(LogLevel::Debug)
            .with_directive("tokio=warn");
        assert_eq!(config.filter_string(), "multiregion=debug,tokio=warn");
    }

    #[test]
    fn test_invalid_directive_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig::default().with_directive("multiregion=notalevel");
        let err = config.env_filter().unwrap_err();
        assert_eq!(err.code(), "Config");
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default().with_directive("multiregion=off");
        init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_config_from_json() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"level": "warn", "format": "compact"}"#).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.with_target);
    }
}
