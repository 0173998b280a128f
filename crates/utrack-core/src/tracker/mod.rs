//! Job tracker facade.
//!
//! `start_tracking` wires one session: a reconciler, a poll scheduler that
//! starts immediately, a push connect + subscribe running concurrently in its
//! own task, and a teardown task that releases both once the reconciler's
//! shutdown token fires (terminal status or cancel).

mod session;
mod teardown;

use std::sync::Arc;

use tracing::Instrument;

use crate::job::{EventSink, UploadJob};
use crate::logging::session_span;
use crate::notify::{NotificationClient, NotificationTransport};
use crate::poll::{self, PollSettings, StatusQuery};
use crate::reconcile::{Reconciler, SessionObserver};

pub use session::TrackerSession;

/// Shared entry point for every upload flow (media and documents alike).
#[derive(Clone)]
pub struct JobTracker {
    transport: Arc<dyn NotificationTransport>,
    query: Arc<dyn StatusQuery>,
    poll: PollSettings,
}

impl JobTracker {
    pub fn new(
        transport: Arc<dyn NotificationTransport>,
        query: Arc<dyn StatusQuery>,
        poll: PollSettings,
    ) -> Self {
        Self {
            transport,
            query,
            poll,
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.poll
    }

    /// Begin tracking a submitted job. Must be called from within a tokio runtime.
    pub fn start_tracking(
        &self,
        job: UploadJob,
        observers: Vec<Arc<dyn SessionObserver>>,
    ) -> TrackerSession {
        let job_id = job.job_id().clone();
        let reconciler = Arc::new(Reconciler::new(job_id.clone(), observers));
        let shutdown = reconciler.shutdown_token().clone();
        let sink: Arc<dyn EventSink> = reconciler.clone();
        let span = session_span(&job_id);
        let _entered = span.enter();

        tracing::info!(
            job_id = %job_id,
            channel = job.channel_address(),
            interval_ms = self.poll.interval.as_millis() as u64,
            max_attempts = self.poll.max_attempts,
            "tracking started"
        );

        let poll = poll::start(
            job_id.clone(),
            self.poll,
            Arc::clone(&self.query),
            Arc::clone(&sink),
            &shutdown,
        );

        let push = tokio::spawn({
            let transport = Arc::clone(&self.transport);
            let address = job.channel_address().to_string();
            let job_id = job_id.clone();
            let shutdown = shutdown.clone();
            async move {
                NotificationClient::open(transport.as_ref(), &address, job_id, sink, &shutdown).await
            }
            .in_current_span()
        });

        let torn_down = tokio_util::sync::CancellationToken::new();
        tokio::spawn(
            teardown::run(job_id, shutdown, poll, push, torn_down.clone()).in_current_span(),
        );

        TrackerSession::new(job, reconciler, torn_down)
    }
}
