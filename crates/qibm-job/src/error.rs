//! Error types for job management.

use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Errors that can occur when talking to the job service.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job does not exist (or no longer exists).
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Missing API token.
    #[error("IBM Quantum API token not found. Set the IBM_QUANTUM_TOKEN environment variable.")]
    MissingToken,

    /// Token cannot be used in a header.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    Api {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Status string not recognised.
    #[error("Unknown job status: {0}")]
    UnknownStatus(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JobError {
    /// Whether this error means the job does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, JobError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = JobError::NotFound("abc123".into());
        assert!(err.to_string().contains("abc123"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_api_error_is_not_not_found() {
        let err = JobError::Api {
            code: Some("3250".into()),
            message: "Job cannot be deleted".into(),
        };
        assert!(err.to_string().contains("cannot be deleted"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_missing_token_display() {
        assert!(JobError::MissingToken.to_string().contains("IBM_QUANTUM_TOKEN"));
    }
}
