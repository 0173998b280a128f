//! Job status endpoint payload and its normalization into `JobStatus`.

use serde::Deserialize;

use crate::job::JobStatus;

use super::error::PollQueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RemoteState {
    Pending,
    Uploading,
    Processing,
    Completed,
    Failed,
}

/// Body of `GET <status_base_url>/<job id>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: RemoteState,
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Absent means the failure is final.
    #[serde(default)]
    pub retryable: Option<bool>,
}

impl StatusResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, PollQueryError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn into_status(self) -> Result<JobStatus, PollQueryError> {
        let percent = JobStatus::percent_from(self.progress_percentage.unwrap_or(0.0));
        let status = match self.status {
            RemoteState::Pending => JobStatus::Pending,
            RemoteState::Uploading => JobStatus::Uploading { percent },
            RemoteState::Processing => JobStatus::Processing {
                percent,
                message: self.message,
            },
            RemoteState::Completed => match self.url {
                Some(result_url) if !result_url.is_empty() => JobStatus::Completed { result_url },
                _ => {
                    return Err(PollQueryError::Malformed(
                        "Completed status without url".to_string(),
                    ))
                }
            },
            RemoteState::Failed => JobStatus::Failed {
                message: self
                    .message
                    .unwrap_or_else(|| "processing failed".to_string()),
                retryable: self.retryable.unwrap_or(false),
            },
        };
        Ok(status)
    }
}
