//! Error types for the test harness.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for harness operations.
pub type SupportResult<T> = Result<T, SupportError>;

/// Errors raised while configuring test logging.
#[derive(Debug, Error)]
pub enum SupportError {
    /// A level string could not be parsed.
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// A filter directive could not be parsed.
    #[error("Invalid log filter '{directives}': {message}")]
    InvalidFilter { directives: String, message: String },

    /// The suite log file could not be created.
    #[error("Cannot create log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
