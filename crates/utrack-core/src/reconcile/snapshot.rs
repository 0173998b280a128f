//! Merged, caller-facing view of one tracked job.

use crate::job::{JobId, JobOutcome, JobStatus};

/// Snapshot of session state after the most recent applied event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSnapshot {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Last known progress; not monotonic.
    pub progress_percent: u8,
    pub status_message: String,
    /// Present once a terminal status was applied.
    pub result: Option<JobOutcome>,
    pub is_terminal: bool,
    pub cancelled: bool,
    pub events_applied: u64,
}

impl TrackerSnapshot {
    pub(crate) fn initial(job_id: JobId) -> Self {
        let status = JobStatus::Pending;
        Self {
            job_id,
            status_message: status.status_message(),
            status,
            progress_percent: 0,
            result: None,
            is_terminal: false,
            cancelled: false,
            events_applied: 0,
        }
    }
}
