//! Observation events: one status reading from one channel.

use std::time::SystemTime;

use super::{JobId, JobStatus};

/// Channel an observation arrived through. Sources have equal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Push,
    Poll,
}

/// A normalized status reading. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationEvent {
    pub source: Source,
    pub job_id: JobId,
    pub status: JobStatus,
    pub observed_at: SystemTime,
}

impl ObservationEvent {
    pub fn new(source: Source, job_id: JobId, status: JobStatus) -> Self {
        Self {
            source,
            job_id,
            status,
            observed_at: SystemTime::now(),
        }
    }

    pub fn push(job_id: JobId, status: JobStatus) -> Self {
        Self::new(Source::Push, job_id, status)
    }

    pub fn poll(job_id: JobId, status: JobStatus) -> Self {
        Self::new(Source::Poll, job_id, status)
    }
}

/// Destination for normalized events. The reconciler is the production sink;
/// tests plug in an unbounded channel.
pub trait EventSink: Send + Sync {
    fn observe(&self, event: ObservationEvent);
}

impl EventSink for tokio::sync::mpsc::UnboundedSender<ObservationEvent> {
    fn observe(&self, event: ObservationEvent) {
        let _ = self.send(event);
    }
}
