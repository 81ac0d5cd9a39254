//! Job identifiers and API job statuses.
//!
//! The job state machine as reported by the API:
//!
//! ```text
//!   CREATING ─→ CREATED ─→ VALIDATING ─→ VALIDATED ─→ QUEUED ─→ RUNNING ─→ COMPLETED
//!      │                      │                         │          │
//!      └→ ERROR_CREATING_JOB  └→ ERROR_VALIDATING_JOB   │          └→ ERROR_RUNNING_JOB
//!                                                       └──────────┴→ CANCELLED
//! ```
//!
//! Final states are permanent; a job in a final state can only be deleted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job status as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiJobStatus {
    Creating,
    Created,
    Validating,
    Validated,
    Queued,
    PendingInQueue,
    Running,
    Completed,
    Cancelled,
    ErrorCreatingJob,
    ErrorValidatingJob,
    ErrorRunningJob,
}

/// Statuses from which a job never moves.
pub const API_JOB_FINAL_STATES: [ApiJobStatus; 5] = [
    ApiJobStatus::Completed,
    ApiJobStatus::Cancelled,
    ApiJobStatus::ErrorCreatingJob,
    ApiJobStatus::ErrorValidatingJob,
    ApiJobStatus::ErrorRunningJob,
];

impl ApiJobStatus {
    const ALL: [ApiJobStatus; 12] = [
        ApiJobStatus::Creating,
        ApiJobStatus::Created,
        ApiJobStatus::Validating,
        ApiJobStatus::Validated,
        ApiJobStatus::Queued,
        ApiJobStatus::PendingInQueue,
        ApiJobStatus::Running,
        ApiJobStatus::Completed,
        ApiJobStatus::Cancelled,
        ApiJobStatus::ErrorCreatingJob,
        ApiJobStatus::ErrorValidatingJob,
        ApiJobStatus::ErrorRunningJob,
    ];

    /// Wire form of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            ApiJobStatus::Creating => "CREATING",
            ApiJobStatus::Created => "CREATED",
            ApiJobStatus::Validating => "VALIDATING",
            ApiJobStatus::Validated => "VALIDATED",
            ApiJobStatus::Queued => "QUEUED",
            ApiJobStatus::PendingInQueue => "PENDING_IN_QUEUE",
            ApiJobStatus::Running => "RUNNING",
            ApiJobStatus::Completed => "COMPLETED",
            ApiJobStatus::Cancelled => "CANCELLED",
            ApiJobStatus::ErrorCreatingJob => "ERROR_CREATING_JOB",
            ApiJobStatus::ErrorValidatingJob => "ERROR_VALIDATING_JOB",
            ApiJobStatus::ErrorRunningJob => "ERROR_RUNNING_JOB",
        }
    }

    /// Check if this is a final state.
    pub fn is_final(self) -> bool {
        API_JOB_FINAL_STATES.contains(&self)
    }

    /// Check if the job ended in an error state.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            ApiJobStatus::ErrorCreatingJob
                | ApiJobStatus::ErrorValidatingJob
                | ApiJobStatus::ErrorRunningJob
        )
    }
}

impl fmt::Display for ApiJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiJobStatus {
    type Err = JobError;

    /// Parse a status string, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| JobError::UnknownStatus(s.to_string()))
    }
}
