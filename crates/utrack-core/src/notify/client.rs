//! Per-session adapter over a notification transport.
//!
//! One best-effort connect + subscribe. On any failure the client is returned
//! detached and the session carries on poll-only.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::job::{EventSink, JobId, ObservationEvent};

use super::message::PushMessage;
use super::{NotificationConnection, NotificationTransport};

/// Aborts the forwarding task when dropped.
struct ForwarderGuard(JoinHandle<()>);

impl ForwarderGuard {
    async fn stop(mut self) {
        self.0.abort();
        let _ = (&mut self.0).await;
    }
}

impl Drop for ForwarderGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Push subscription owned by exactly one tracker session.
pub struct NotificationClient {
    job_id: JobId,
    connection: Option<Box<dyn NotificationConnection>>,
    forwarder: Option<ForwarderGuard>,
    /// True once a subscribe was sent, even if its reply never arrived.
    subscribed: bool,
}

impl NotificationClient {
    /// A client with no connection; `shutdown` is a no-op.
    pub fn detached(job_id: JobId) -> Self {
        Self {
            job_id,
            connection: None,
            forwarder: None,
            subscribed: false,
        }
    }

    /// Connect to `address`, subscribe to the job's group and start forwarding
    /// pushes for this job into `sink`. Never fails: errors are logged and a
    /// detached client is returned.
    ///
    /// `shutdown` ends the handshake early. While connecting nothing is held
    /// yet, so the attempt is dropped. Once a connection exists it is never
    /// dropped here: a subscribe cut short still counts as possibly accepted,
    /// and the returned client unsubscribes and closes on `shutdown()`.
    pub async fn open(
        transport: &dyn NotificationTransport,
        address: &str,
        job_id: JobId,
        sink: Arc<dyn EventSink>,
        shutdown: &CancellationToken,
    ) -> Self {
        if address.trim().is_empty() {
            tracing::info!(job_id = %job_id, "no notification address; tracking poll-only");
            return Self::detached(job_id);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let connected = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                tracing::debug!(job_id = %job_id, address, "push connect abandoned at shutdown");
                return Self::detached(job_id);
            }
            r = transport.connect(address, tx) => r,
        };
        let connection = match connected {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(job_id = %job_id, address, "push connect failed, tracking poll-only: {}", e);
                return Self::detached(job_id);
            }
        };

        // Forward before subscribing so no early push is lost.
        let forwarder = ForwarderGuard(tokio::spawn(
            forward_messages(job_id.clone(), rx, sink).in_current_span(),
        ));

        let subscribed = tokio::select! {
            biased;
            _ = shutdown.cancelled() => None,
            r = connection.subscribe(job_id.as_str()) => Some(r),
        };
        match subscribed {
            None => {
                tracing::debug!(job_id = %job_id, address, "push subscribe interrupted by shutdown");
                forwarder.stop().await;
                Self {
                    job_id,
                    connection: Some(connection),
                    forwarder: None,
                    subscribed: true,
                }
            }
            Some(Err(e)) => {
                tracing::warn!(job_id = %job_id, address, "push subscribe failed, tracking poll-only: {}", e);
                forwarder.stop().await;
                connection.close().await;
                Self::detached(job_id)
            }
            Some(Ok(())) => {
                tracing::debug!(job_id = %job_id, address, "push channel subscribed");
                Self {
                    job_id,
                    connection: Some(connection),
                    forwarder: Some(forwarder),
                    subscribed: true,
                }
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Stop forwarding, unsubscribe and close the connection. After this
    /// returns no push can reach the sink.
    pub async fn shutdown(mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.stop().await;
        }
        let Some(connection) = self.connection.take() else {
            return;
        };
        if self.subscribed {
            if let Err(e) = connection.unsubscribe(self.job_id.as_str()).await {
                tracing::debug!(job_id = %self.job_id, "push unsubscribe failed: {}", e);
            }
            self.subscribed = false;
        }
        connection.close().await;
        tracing::debug!(job_id = %self.job_id, "push channel closed");
    }
}

async fn forward_messages(
    job_id: JobId,
    mut rx: mpsc::UnboundedReceiver<PushMessage>,
    sink: Arc<dyn EventSink>,
) {
    while let Some(message) = rx.recv().await {
        if message.job_id != job_id {
            continue;
        }
        match message.to_status() {
            Some(status) => {
                tracing::debug!(job_id = %job_id, ?status, "push observed status");
                sink.observe(ObservationEvent::push(job_id.clone(), status));
            }
            None => {
                tracing::warn!(job_id = %job_id, event = ?message.event, "dropping unusable push message");
            }
        }
    }
}
