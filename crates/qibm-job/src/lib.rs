//! Job status model and job-management client for IBM Quantum.
//!
//! - [`ApiJobStatus`] and [`API_JOB_FINAL_STATES`]: the statuses the API
//!   reports and which of them are final
//! - [`JobClient`]: status, cancel and delete operations on a submitted job
//! - [`IbmJobClient`]: the REST implementation
//!
//! # Example
//!
//! ```ignore
//! use qibm_job::{IbmJobClient, JobClient, JobId};
//!
//! let client = IbmJobClient::from_env()?;
//! let job_id = JobId::from("cjk2le1zd");
//!
//! let info = client.job_get(&job_id).await?;
//! if !info.api_status()?.is_final() {
//!     client.job_cancel(&job_id).await?;
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod status;

pub use api::IbmJobClient;
pub use client::{JobClient, JobInfo, QueueInfo};
pub use error::{JobError, JobResult};
pub use status::{API_JOB_FINAL_STATES, ApiJobStatus, JobId};
