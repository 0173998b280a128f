//! Job status variants and the outcome reported to the caller.

/// Failure message synthesized by the poll scheduler when it runs out of
/// attempts without seeing a terminal status from the server.
pub const POLL_EXHAUSTED_MESSAGE: &str = "timeout";

/// Status of a server-side job as observed through either channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Uploading {
        percent: u8,
    },
    Processing {
        percent: u8,
        message: Option<String>,
    },
    Completed {
        result_url: String,
    },
    /// `retryable = true` is informational only; `false` ends tracking.
    Failed {
        message: String,
        retryable: bool,
    },
    FailedPermanently {
        message: String,
    },
}

impl JobStatus {
    /// Clamp a wire percentage into `0..=100`. NaN maps to 0.
    pub fn percent_from(raw: f64) -> u8 {
        if raw.is_nan() {
            return 0;
        }
        raw.round().clamp(0.0, 100.0) as u8
    }

    /// True for statuses after which no further update is meaningful.
    /// `Failed { retryable: false }` counts as terminal.
    pub fn is_terminal(&self) -> bool {
        match self {
            JobStatus::Completed { .. } | JobStatus::FailedPermanently { .. } => true,
            JobStatus::Failed { retryable, .. } => !retryable,
            JobStatus::Pending | JobStatus::Uploading { .. } | JobStatus::Processing { .. } => {
                false
            }
        }
    }

    /// Progress implied by this status, or None when the previous value should stand.
    pub fn progress_hint(&self) -> Option<u8> {
        match self {
            JobStatus::Pending => Some(0),
            JobStatus::Uploading { percent } | JobStatus::Processing { percent, .. } => {
                Some(*percent)
            }
            JobStatus::Completed { .. } => Some(100),
            JobStatus::Failed { .. } | JobStatus::FailedPermanently { .. } => None,
        }
    }

    /// Human-readable status line.
    pub fn status_message(&self) -> String {
        match self {
            JobStatus::Pending => "Waiting for processing".to_string(),
            JobStatus::Uploading { percent } => format!("Uploading ({percent}%)"),
            JobStatus::Processing { percent, message } => match message {
                Some(m) if !m.is_empty() => m.clone(),
                _ => format!("Processing ({percent}%)"),
            },
            JobStatus::Completed { .. } => "Completed".to_string(),
            JobStatus::Failed { message, .. } | JobStatus::FailedPermanently { message } => {
                message.clone()
            }
        }
    }

    /// The outcome this status resolves to, if it is terminal.
    pub fn outcome(&self) -> Option<JobOutcome> {
        if !self.is_terminal() {
            return None;
        }
        match self {
            JobStatus::Completed { result_url } => Some(JobOutcome::Completed {
                result_url: result_url.clone(),
            }),
            JobStatus::Failed { message, .. } | JobStatus::FailedPermanently { message } => {
                Some(JobOutcome::Failed {
                    message: message.clone(),
                })
            }
            _ => None,
        }
    }
}

/// Final result handed to the caller's completion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { result_url: String },
    Failed { message: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }

    /// True when tracking gave up (poll budget exhausted) rather than the job failing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, JobOutcome::Failed { message } if message == POLL_EXHAUSTED_MESSAGE)
    }
}
