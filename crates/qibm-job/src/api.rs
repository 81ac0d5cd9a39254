//! REST implementation of [`JobClient`] against the IBM Quantum jobs API.
//!
//! - `GET /v1/jobs/{id}`: job record
//! - `POST /v1/jobs/{id}/cancel`: cancel
//! - `DELETE /v1/jobs/{id}`: delete
//!
//! A `404` from any of these maps to [`JobError::NotFound`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;

use crate::client::{JobClient, JobInfo};
use crate::error::{JobError, JobResult};
use crate::status::JobId;

/// Default IBM Quantum API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "IBM_QUANTUM_TOKEN";

/// Environment variable overriding the endpoint.
pub const ENDPOINT_ENV: &str = "IBM_QUANTUM_ENDPOINT";

const USER_AGENT: &str = concat!("qibm-job/", env!("CARGO_PKG_VERSION"));

/// IBM Quantum jobs API client.
pub struct IbmJobClient {
    client: Client,
    endpoint: String,
}

impl fmt::Debug for IbmJobClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmJobClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// API error body.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

impl IbmJobClient {
    /// Create a client for `endpoint` authenticating with `token`.
    pub fn new(endpoint: impl Into<String>, token: &str) -> JobResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| JobError::InvalidToken)?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Ok(Self { client, endpoint })
    }

    /// Create a client from `IBM_QUANTUM_TOKEN` and, if set, `IBM_QUANTUM_ENDPOINT`.
    pub fn from_env() -> JobResult<Self> {
        let token = std::env::var(TOKEN_ENV).map_err(|_| JobError::MissingToken)?;
        let endpoint = std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint, &token)
    }

    /// The API endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn job_url(&self, job_id: &JobId) -> String {
        format!("{}/v1/jobs/{}", self.endpoint, job_id)
    }

    /// Turn a non-success response into an error.
    async fn error_for(response: Response, job_id: &JobId) -> JobError {
        if response.status() == StatusCode::NOT_FOUND {
            return JobError::NotFound(job_id.to_string());
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(error) => JobError::Api {
                code: error.code,
                message: error.message,
            },
            Err(_) => JobError::Api {
                code: Some(status.as_u16().to_string()),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            },
        }
    }
}

#[async_trait]
impl JobClient for IbmJobClient {
    async fn job_get(&self, job_id: &JobId) -> JobResult<JobInfo> {
        let response = self.client.get(self.job_url(job_id)).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, job_id).await);
        }
        response.json().await.map_err(JobError::from)
    }

    async fn job_cancel(&self, job_id: &JobId) -> JobResult<()> {
        let url = format!("{}/cancel", self.job_url(job_id));
        let response = self.client.post(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, job_id).await);
        }
        tracing::debug!(%job_id, "cancel requested");
        Ok(())
    }

    async fn job_delete(&self, job_id: &JobId) -> JobResult<()> {
        let response = self.client.delete(self.job_url(job_id)).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, job_id).await);
        }
        tracing::debug!(%job_id, "job deleted");
        Ok(())
    }
}
