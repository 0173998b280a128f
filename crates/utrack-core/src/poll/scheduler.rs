//! Poll loop: one task per session, cancelled through a token.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::job::{EventSink, JobId, JobStatus, ObservationEvent, POLL_EXHAUSTED_MESSAGE};

use super::error::classify;
use super::StatusQuery;

/// Timing and budget for one poll scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between a response and the next query.
    pub interval: Duration,
    /// Delay before the first query.
    pub initial_delay: Duration,
    /// Successful, non-terminal queries allowed before giving up. At least 1;
    /// the loop treats 0 as 1.
    pub max_attempts: u32,
}

impl PollSettings {
    /// `max_attempts` is clamped to at least 1.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            initial_delay: interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

/// Why the poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// A query returned a terminal status.
    Terminal,
    /// `max_attempts` non-terminal results; a timeout failure was emitted.
    Exhausted,
    /// Cancelled by `stop` or by session teardown.
    Stopped,
}

/// Counters and exit reason returned when the loop finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub exit: PollExit,
    pub attempts: u32,
    pub errors: u32,
}

/// Owns the poll task. Dropping the handle cancels the loop; `stop` also
/// waits for it, so nothing reaches the sink after `stop` returns.
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<PollSummary>>,
}

impl PollHandle {
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel any pending timer or query and wait for the task to exit.
    pub async fn stop(mut self) -> Option<PollSummary> {
        self.cancel.cancel();
        let task = self.task.take()?;
        match task.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("poll task join: {}", e);
                None
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start polling `job_id`. The loop exits on its own after a terminal result
/// or when the budget is spent; `cancel` (usually the session shutdown token)
/// stops it early. Must be called from within a tokio runtime.
pub fn start(
    job_id: JobId,
    settings: PollSettings,
    query: Arc<dyn StatusQuery>,
    sink: Arc<dyn EventSink>,
    cancel: &CancellationToken,
) -> PollHandle {
    let cancel = cancel.child_token();
    let task = tokio::spawn(
        run_poll_loop(job_id, settings, query, sink, cancel.clone()).in_current_span(),
    );
    PollHandle {
        cancel,
        task: Some(task),
    }
}

async fn run_poll_loop(
    job_id: JobId,
    settings: PollSettings,
    query: Arc<dyn StatusQuery>,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
) -> PollSummary {
    let mut summary = PollSummary {
        exit: PollExit::Stopped,
        attempts: 0,
        errors: 0,
    };
    let max_attempts = settings.max_attempts.max(1);
    let mut delay = settings.initial_delay;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return summary,
            _ = tokio::time::sleep(delay) => {}
        }
        delay = settings.interval;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return summary,
            r = query.query(&job_id) => r,
        };

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                summary.errors += 1;
                tracing::warn!(
                    job_id = %job_id,
                    kind = ?classify(&e),
                    "status query failed, retrying next tick: {}",
                    e
                );
                continue;
            }
        };

        if cancel.is_cancelled() {
            return summary;
        }

        let terminal = status.is_terminal();
        tracing::debug!(job_id = %job_id, ?status, "poll observed status");
        sink.observe(ObservationEvent::poll(job_id.clone(), status));
        if terminal {
            summary.exit = PollExit::Terminal;
            return summary;
        }

        summary.attempts += 1;
        if summary.attempts >= max_attempts {
            tracing::info!(
                job_id = %job_id,
                attempts = summary.attempts,
                "poll budget exhausted without a terminal status"
            );
            sink.observe(ObservationEvent::poll(
                job_id.clone(),
                JobStatus::Failed {
                    message: POLL_EXHAUSTED_MESSAGE.to_string(),
                    retryable: false,
                },
            ));
            summary.exit = PollExit::Exhausted;
            return summary;
        }
    }
}
