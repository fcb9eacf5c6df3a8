//! Async export jobs.
//!
//! Exports run server-side: a trigger call returns a job id, the client
//! polls `/api/jobs/status/:id` until the job reaches a terminal state, and
//! the finished artifact is fetched from `/api/jobs/download/:filename`.
//! Polling is bounded and surfaces a timeout to the caller; it never papers
//! over a failed job.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiClient, ApiError};

/// Poll interval between job status checks.
const POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct JobTicket {
    #[serde(alias = "jobId", alias = "id")]
    pub job_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[serde(alias = "queued")]
    Pending,
    #[serde(alias = "processing", alias = "started")]
    Running,
    #[serde(alias = "finished", alias = "success")]
    Completed,
    #[serde(alias = "failure", alias = "error")]
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    #[serde(alias = "jobId", alias = "id")]
    pub job_id: String,
    #[serde(alias = "state")]
    pub status: JobState,
    /// Artifact name, present once the job completes
    #[serde(default, alias = "result")]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Error, Debug)]
pub enum JobPollError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Export job {job_id} did not finish within {waited_secs}s")]
    TimedOut { job_id: String, waited_secs: u64 },
}

impl ApiClient {
    /// Trigger a quiz export for the logged-in user.
    pub async fn export_quizzes(&self) -> Result<JobTicket, ApiError> {
        self.post_empty("/api/jobs/user/export/quiz").await
    }

    /// Trigger a full users export (admin only).
    pub async fn export_users(&self) -> Result<JobTicket, ApiError> {
        self.post_empty("/api/jobs/admin/export/users").await
    }

    pub async fn job_status(&self, job_id: &str) -> Result<JobStatus, ApiError> {
        self.get(&format!("/api/jobs/status/{}", job_id)).await
    }

    /// URL of a finished export artifact.
    pub fn download_url(&self, filename: &str) -> String {
        format!("{}/api/jobs/download/{}", self.base_url(), filename)
    }

    /// Poll a job until it reaches a terminal state or `timeout` elapses.
    /// A Failed job is returned as a status, not an error; only transport
    /// problems and the poll deadline produce `Err`.
    pub async fn wait_for_job(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> Result<JobStatus, JobPollError> {
        poll_until_terminal(job_id, timeout, || self.job_status(job_id)).await
    }
}

/// The poll loop behind `wait_for_job`, generic over the status source so
/// the deadline and terminal-state exits can be driven without a server.
async fn poll_until_terminal<F, Fut>(
    job_id: &str,
    timeout: Duration,
    mut fetch: F,
) -> Result<JobStatus, JobPollError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<JobStatus, ApiError>>,
{
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let status = fetch().await?;
        if status.status.is_terminal() {
            debug!(job_id, status = ?status.status, "Export job finished");
            return Ok(status);
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(JobPollError::TimedOut {
                job_id: job_id.to_string(),
                waited_secs: timeout.as_secs(),
            });
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}
