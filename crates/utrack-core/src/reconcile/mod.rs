//! Reconciler: the single authority over one session's status.
//!
//! Events from the push and poll channels are applied in arrival order with no
//! source priority. The first terminal status closes the gate: it is applied,
//! observers get `on_outcome` exactly once, and the session shutdown token is
//! cancelled so the tracker tears both channels down. Everything after that is
//! discarded, including events that were already in flight.
//!
//! The check-and-set on the terminal flag happens under one mutex, so two
//! terminal events racing from different tasks cannot both win. Observer
//! delivery is serialized by a second mutex and never goes backwards: a
//! snapshot older than the last one delivered is skipped, so the terminal
//! status is always the last thing an observer sees.

mod snapshot;

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::job::{EventSink, JobId, JobOutcome, JobStatus, ObservationEvent};

pub use snapshot::TrackerSnapshot;

/// Per-session callbacks. Both methods run outside the state lock but under
/// the delivery lock; they must not call back into `Reconciler::apply`.
pub trait SessionObserver: Send + Sync {
    /// Called after every applied event, terminal ones included.
    fn on_status(&self, _snapshot: &TrackerSnapshot) {}

    /// Called exactly once when a terminal status is applied; never on cancel.
    fn on_outcome(&self, _outcome: &JobOutcome) {}
}

/// What `apply` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Session already terminal (or event for another job); nothing changed.
    Discarded,
    /// Non-terminal status applied.
    Updated,
    /// This event closed the session.
    Terminal,
}

struct SessionState {
    status: JobStatus,
    progress_percent: u8,
    is_terminal: bool,
    cancelled: bool,
    outcome: Option<JobOutcome>,
    events_applied: u64,
}

impl SessionState {
    fn snapshot(&self, job_id: &JobId) -> TrackerSnapshot {
        let status_message = if self.cancelled {
            "Tracking cancelled".to_string()
        } else {
            self.status.status_message()
        };
        TrackerSnapshot {
            job_id: job_id.clone(),
            status: self.status.clone(),
            progress_percent: self.progress_percent,
            status_message,
            result: self.outcome.clone(),
            is_terminal: self.is_terminal,
            cancelled: self.cancelled,
            events_applied: self.events_applied,
        }
    }
}

pub struct Reconciler {
    job_id: JobId,
    state: Mutex<SessionState>,
    observers: Vec<Arc<dyn SessionObserver>>,
    /// `events_applied` of the last snapshot handed to observers.
    delivered: Mutex<u64>,
    snapshots: watch::Sender<TrackerSnapshot>,
    shutdown: CancellationToken,
}

impl Reconciler {
    pub fn new(job_id: JobId, observers: Vec<Arc<dyn SessionObserver>>) -> Self {
        let (snapshots, _) = watch::channel(TrackerSnapshot::initial(job_id.clone()));
        Self {
            job_id,
            state: Mutex::new(SessionState {
                status: JobStatus::Pending,
                progress_percent: 0,
                is_terminal: false,
                cancelled: false,
                outcome: None,
                events_applied: 0,
            }),
            observers,
            delivered: Mutex::new(0),
            snapshots,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Cancelled when the session becomes terminal or is cancelled.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.lock_state().is_terminal
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply one observation.
    pub fn apply(&self, event: ObservationEvent) -> Applied {
        if event.job_id != self.job_id {
            tracing::debug!(
                job_id = %self.job_id,
                other = %event.job_id,
                "discarding event for another job"
            );
            return Applied::Discarded;
        }

        let (snapshot, outcome) = {
            let mut state = self.lock_state();
            if state.is_terminal {
                tracing::trace!(job_id = %self.job_id, source = ?event.source, "session terminal; event discarded");
                return Applied::Discarded;
            }
            if let Some(percent) = event.status.progress_hint() {
                state.progress_percent = percent;
            }
            state.status = event.status;
            state.events_applied += 1;
            let outcome = state.status.outcome();
            if outcome.is_some() {
                state.is_terminal = true;
                state.outcome = outcome.clone();
            }
            let snapshot = state.snapshot(&self.job_id);
            self.snapshots.send_replace(snapshot.clone());
            (snapshot, outcome)
        };

        self.deliver(&snapshot, outcome.as_ref());

        let Some(outcome) = outcome else {
            return Applied::Updated;
        };

        tracing::info!(
            job_id = %self.job_id,
            source = ?event.source,
            success = outcome.is_success(),
            "job reached terminal status"
        );
        self.shutdown.cancel();
        Applied::Terminal
    }

    /// Hand one applied snapshot to the observers, in `events_applied` order.
    /// A snapshot overtaken by a newer delivery is dropped; the terminal one
    /// is the newest a session ever produces, so it is never dropped.
    fn deliver(&self, snapshot: &TrackerSnapshot, outcome: Option<&JobOutcome>) {
        if self.observers.is_empty() {
            return;
        }
        let mut delivered = self
            .delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if snapshot.events_applied <= *delivered {
            tracing::trace!(
                job_id = %self.job_id,
                stale = snapshot.events_applied,
                delivered = *delivered,
                "skipping overtaken status update"
            );
            return;
        }
        *delivered = snapshot.events_applied;
        for observer in &self.observers {
            observer.on_status(snapshot);
        }
        if let Some(outcome) = outcome {
            for observer in &self.observers {
                observer.on_outcome(outcome);
            }
        }
    }

    /// Mark the session terminal without an outcome. Returns false if it was
    /// already terminal. Either way the shutdown token ends up cancelled.
    pub fn cancel(&self) -> bool {
        let changed = {
            let mut state = self.lock_state();
            if state.is_terminal {
                false
            } else {
                state.is_terminal = true;
                state.cancelled = true;
                self.snapshots.send_replace(state.snapshot(&self.job_id));
                true
            }
        };
        if changed {
            tracing::info!(job_id = %self.job_id, "tracking cancelled");
        }
        self.shutdown.cancel();
        changed
    }
}

impl EventSink for Reconciler {
    fn observe(&self, event: ObservationEvent) {
        self.apply(event);
    }
}
