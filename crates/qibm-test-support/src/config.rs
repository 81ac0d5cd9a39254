//! Test logging configuration.

use tracing_subscriber::filter::LevelFilter;

use crate::error::{SupportError, SupportResult};

/// Suite level used when `LOG_LEVEL` is unset or invalid.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::DEBUG;

/// Logging configuration for a test suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestLogConfig {
    /// Suite log level (e.g., "debug", "info", "warning").
    pub level: String,
    /// Library log level or filter directives; inherits `level` when unset.
    pub library_level: Option<String>,
    /// Also echo suite events to the test output.
    pub stream_log: bool,
    /// Write suite events to a log file next to the test source.
    pub file_log: bool,
}

impl Default for TestLogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            library_level: None,
            stream_log: false,
            file_log: true,
        }
    }
}

impl TestLogConfig {
    /// Create config from environment variables.
    ///
    /// Environment variables:
    /// - `LOG_LEVEL`: suite level (default: "debug")
    /// - `QIBM_LOG_LEVEL`: library level or directives (default: suite level)
    /// - `STREAM_LOG`: "true" to echo suite events (default: false)
    /// - `FILE_LOG`: "false" to skip the log file (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            level: lookup("LOG_LEVEL").unwrap_or(defaults.level),
            library_level: lookup("QIBM_LOG_LEVEL").filter(|l| !l.trim().is_empty()),
            stream_log: lookup("STREAM_LOG").map_or(defaults.stream_log, |v| is_truthy(&v)),
            file_log: lookup("FILE_LOG").map_or(defaults.file_log, |v| is_truthy(&v)),
        }
    }

    /// Parsed suite level.
    pub fn suite_level(&self) -> SupportResult<LevelFilter> {
        parse_level(&self.level)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a level name. Accepts `tracing` names and the conventional
/// `warning`, `critical`, `fatal` and `notset` aliases, ignoring case.
pub fn parse_level(level: &str) -> SupportResult<LevelFilter> {
    let normalized = level.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "warning" => Ok(LevelFilter::WARN),
        "critical" | "fatal" => Ok(LevelFilter::ERROR),
        "notset" => Ok(LevelFilter::TRACE),
        other => other
            .parse()
            .map_err(|_| SupportError::InvalidLevel(level.to_string())),
    }
}
