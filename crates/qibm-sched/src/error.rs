//! Error handling for duration lookup and patching.

use qibm_backend::{BackendError, TimeUnit};
use thiserror::Error;

/// Result type for scheduling operations.
pub type SchedResult<T> = Result<T, SchedError>;

/// Errors that can occur while building or querying duration tables.
#[derive(Error, Debug)]
pub enum SchedError {
    /// Neither an exact nor a wildcard entry exists.
    #[error("Duration of {name} on qubits {qubits:?} is not found.")]
    DurationNotFound { name: String, qubits: Vec<u32> },

    /// A unit conversion needs the sample time but none is set.
    #[error("dt is necessary to convert durations from '{from}' to '{to}'")]
    MissingDt { from: TimeUnit, to: TimeUnit },

    /// Sample time must be a positive finite number of seconds.
    #[error("Invalid dt: {0}")]
    InvalidDt(f64),

    /// Duration value must be finite and non-negative.
    #[error("Invalid duration {value} for {name}")]
    InvalidDuration { name: String, value: f64 },

    /// A measurement duration could not be expressed in `dt` for patching.
    #[error("Can only patch durations expressible in dt: {0}")]
    PatchUnit(String),

    /// Backend record error.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
