//! The job-management seam.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::JobResult;
use crate::status::{ApiJobStatus, JobId};

/// Job record returned by a status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Job ID.
    pub id: String,
    /// Raw status string.
    pub status: String,
    /// Backend name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    /// Queue information, while queued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_info: Option<QueueInfo>,
}

/// Queue position details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueInfo {
    /// Position in the backend queue.
    #[serde(default)]
    pub position: Option<u32>,
    /// Queue status string.
    #[serde(default)]
    pub status: Option<String>,
}

impl fmt::Display for QueueInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.position, self.status.as_deref()) {
            (Some(position), Some(status)) => write!(f, "position {position} ({status})"),
            (Some(position), None) => write!(f, "position {position}"),
            (None, Some(status)) => f.write_str(status),
            (None, None) => f.write_str("unknown"),
        }
    }
}

impl JobInfo {
    /// Create a record with the given status.
    pub fn new(id: impl Into<String>, status: ApiJobStatus) -> Self {
        Self {
            id: id.into(),
            status: status.as_str().to_string(),
            backend: None,
            creation_date: None,
            queue_info: None,
        }
    }

    /// Parsed status.
    pub fn api_status(&self) -> JobResult<ApiJobStatus> {
        self.status.parse()
    }
}

/// Operations on submitted jobs.
///
/// `job_delete` on a job that no longer exists must fail with
/// [`JobError::NotFound`](crate::JobError::NotFound).
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Fetch the current job record.
    async fn job_get(&self, job_id: &JobId) -> JobResult<JobInfo>;

    /// Request cancellation.
    async fn job_cancel(&self, job_id: &JobId) -> JobResult<()>;

    /// Delete the job.
    async fn job_delete(&self, job_id: &JobId) -> JobResult<()>;
}
