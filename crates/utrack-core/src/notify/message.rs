//! Messages pushed by the notification server.

use serde::{Deserialize, Serialize};

use crate::job::{JobId, JobStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PushKind {
    Progress,
    Completed,
    Failed,
    FailedPermanently,
}

/// One server push: `{"event": ..., "jobId": ..., "percentage"?, "message"?, "url"?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub event: PushKind,
    pub job_id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PushMessage {
    pub fn progress(job_id: impl Into<JobId>, percentage: f64) -> Self {
        Self::bare(PushKind::Progress, job_id).with_percentage(percentage)
    }

    pub fn completed(job_id: impl Into<JobId>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::bare(PushKind::Completed, job_id)
        }
    }

    pub fn failed(job_id: impl Into<JobId>, message: impl Into<String>) -> Self {
        Self::bare(PushKind::Failed, job_id).with_message(message)
    }

    pub fn failed_permanently(job_id: impl Into<JobId>, message: impl Into<String>) -> Self {
        Self::bare(PushKind::FailedPermanently, job_id).with_message(message)
    }

    fn bare(event: PushKind, job_id: impl Into<JobId>) -> Self {
        Self {
            event,
            job_id: job_id.into(),
            percentage: None,
            message: None,
            url: None,
        }
    }

    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Normalize into a status. None when the message is unusable
    /// (a completion without a result url).
    pub fn to_status(&self) -> Option<JobStatus> {
        let status = match self.event {
            PushKind::Progress => JobStatus::Processing {
                percent: JobStatus::percent_from(self.percentage.unwrap_or(0.0)),
                message: self.message.clone(),
            },
            PushKind::Completed => JobStatus::Completed {
                result_url: self.url.clone().filter(|u| !u.is_empty())?,
            },
            PushKind::Failed => JobStatus::Failed {
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| "processing failed, retrying".to_string()),
                retryable: true,
            },
            PushKind::FailedPermanently => JobStatus::FailedPermanently {
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| "processing failed".to_string()),
            },
        };
        Some(status)
    }
}
