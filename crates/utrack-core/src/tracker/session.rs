//! Caller-facing handle for one tracked upload.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::job::{JobId, JobOutcome, JobStatus, UploadJob};
use crate::reconcile::{Reconciler, TrackerSnapshot};

/// Live tracking session. Dropping it cancels tracking.
pub struct TrackerSession {
    job: UploadJob,
    reconciler: Arc<Reconciler>,
    torn_down: CancellationToken,
}

impl TrackerSession {
    pub(super) fn new(job: UploadJob, reconciler: Arc<Reconciler>, torn_down: CancellationToken) -> Self {
        Self {
            job,
            reconciler,
            torn_down,
        }
    }

    pub fn job(&self) -> &UploadJob {
        &self.job
    }

    pub fn job_id(&self) -> &JobId {
        self.job.job_id()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.reconciler.snapshot()
    }

    pub fn status(&self) -> JobStatus {
        self.snapshot().status
    }

    pub fn progress_percent(&self) -> u8 {
        self.snapshot().progress_percent
    }

    pub fn status_message(&self) -> String {
        self.snapshot().status_message
    }

    /// Absent until a terminal status was applied; stays absent after cancel.
    pub fn result(&self) -> Option<JobOutcome> {
        self.snapshot().result
    }

    pub fn is_terminal(&self) -> bool {
        self.reconciler.is_terminal()
    }

    /// True once the poll task and push subscription have been released.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.is_cancelled()
    }

    /// Receiver that is notified after every applied event.
    pub fn watch(&self) -> watch::Receiver<TrackerSnapshot> {
        self.reconciler.subscribe()
    }

    /// Stop tracking without an outcome. Late events are discarded from this
    /// point on; returns after both channels are released. False if the
    /// session had already reached a terminal status.
    pub async fn cancel(&self) -> bool {
        let cancelled = self.reconciler.cancel();
        self.torn_down.cancelled().await;
        cancelled
    }

    /// Wait until the session is torn down. None if it was cancelled.
    pub async fn finished(&self) -> Option<JobOutcome> {
        self.torn_down.cancelled().await;
        self.result()
    }
}

impl Drop for TrackerSession {
    fn drop(&mut self) {
        self.reconciler.cancel();
    }
}
