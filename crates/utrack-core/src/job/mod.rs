//! Upload job identity and the status vocabulary shared by both channels.
//!
//! Everything the push and poll channels observe is normalized into
//! [`JobStatus`] wrapped in an [`ObservationEvent`] before it reaches the
//! reconciler, so the state machine only ever matches on a closed set.

mod event;
mod status;

pub use event::{EventSink, ObservationEvent, Source};
pub use status::{JobOutcome, JobStatus, POLL_EXHAUSTED_MESSAGE};

use std::fmt;
use std::time::SystemTime;

/// Opaque job identifier handed out by the backend when a submission succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A submitted upload: created once the submitter has a job id, never mutated.
#[derive(Debug, Clone)]
pub struct UploadJob {
    job_id: JobId,
    channel_address: String,
    created_at: SystemTime,
}

impl UploadJob {
    /// Record a successful submission. `channel_address` is where the push
    /// channel for this job can be reached (may be empty when push is unused).
    pub fn new(job_id: impl Into<JobId>, channel_address: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            channel_address: channel_address.into(),
            created_at: SystemTime::now(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn channel_address(&self) -> &str {
        &self.channel_address
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}
