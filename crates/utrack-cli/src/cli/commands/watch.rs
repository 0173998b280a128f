//! `utrack watch` – track one job over push and poll until it settles.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use utrack_core::config::TrackerConfig;
use utrack_core::poll::PollSettings;
use utrack_core::{JobOutcome, JobTracker, UploadJob};

/// Command-line overrides for one watch run.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub channel: Option<String>,
    pub interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub no_push: bool,
}

/// Push address for this run; empty means poll-only.
pub fn channel_address(cfg: &TrackerConfig, opts: &WatchOptions) -> String {
    if opts.no_push {
        return String::new();
    }
    opts.channel
        .clone()
        .or_else(|| cfg.notification_address.clone())
        .unwrap_or_default()
}

pub fn poll_settings(cfg: &TrackerConfig, opts: &WatchOptions) -> Result<PollSettings> {
    let mut settings = cfg.poll.settings();
    if let Some(ms) = opts.interval_ms {
        if ms == 0 {
            bail!("--interval-ms must be greater than zero");
        }
        settings.interval = Duration::from_millis(ms);
        if cfg.poll.initial_delay_ms.is_none() {
            settings.initial_delay = settings.interval;
        }
    }
    if let Some(n) = opts.max_attempts {
        if n == 0 {
            bail!("--max-attempts must be at least 1");
        }
        settings.max_attempts = n;
    }
    Ok(settings)
}

pub async fn run_watch(cfg: &TrackerConfig, job_id: &str, opts: &WatchOptions) -> Result<()> {
    let settings = poll_settings(cfg, opts)?;
    let tracker = JobTracker::new(
        Arc::new(cfg.transport()),
        Arc::new(cfg.status_query()?),
        settings,
    );
    let session = tracker.start_tracking(UploadJob::new(job_id, channel_address(cfg, opts)), Vec::new());

    let mut updates = session.watch();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                session.cancel().await;
                bail!("tracking of {} cancelled", job_id);
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                println!("{:>3}%  {}", snapshot.progress_percent, snapshot.status_message);
                if snapshot.is_terminal {
                    break;
                }
            }
        }
    }

    match session.finished().await {
        Some(JobOutcome::Completed { result_url }) => {
            println!("completed: {}", result_url);
            Ok(())
        }
        Some(outcome) if outcome.is_timeout() => {
            bail!("gave up on {} after {} status checks", job_id, settings.max_attempts)
        }
        Some(JobOutcome::Failed { message }) => bail!("job {} failed: {}", job_id, message),
        None => bail!("tracking of {} cancelled", job_id),
    }
}
