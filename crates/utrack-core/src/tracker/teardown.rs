//! Session teardown: waits for the shutdown token, then releases both channels.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::job::JobId;
use crate::notify::NotificationClient;
use crate::poll::PollHandle;

/// Runs once per session. `torn_down` is cancelled when both the poll task
/// and the push subscription are released (also if this task panics).
pub(super) async fn run(
    job_id: JobId,
    shutdown: CancellationToken,
    poll: PollHandle,
    push: JoinHandle<NotificationClient>,
    torn_down: CancellationToken,
) {
    let _done = torn_down.drop_guard();
    shutdown.cancelled().await;

    let summary = poll.stop().await;

    // The handshake watches `shutdown` itself and returns promptly; any
    // connection it made comes back inside the client.
    match push.await {
        Ok(client) => client.shutdown().await,
        Err(e) => tracing::warn!(job_id = %job_id, "push task join: {}", e),
    }

    tracing::debug!(job_id = %job_id, poll = ?summary, "session torn down");
}
