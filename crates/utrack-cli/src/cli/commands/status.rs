//! `utrack status` – one query against the status endpoint.

use anyhow::{Context, Result};
use utrack_core::config::TrackerConfig;
use utrack_core::poll::StatusQuery;
use utrack_core::JobId;

pub async fn run_status(cfg: &TrackerConfig, job_id: &str) -> Result<()> {
    let query = cfg.status_query()?;
    let job_id = JobId::new(job_id);
    let status = query
        .query(&job_id)
        .await
        .with_context(|| format!("query status of {}", job_id))?;

    let progress = status
        .progress_hint()
        .map(|p| format!("{p}%"))
        .unwrap_or_else(|| "-".to_string());
    println!("{:<24} {:<8} {}", "JOB", "PROGRESS", "STATUS");
    println!("{:<24} {:<8} {}", job_id, progress, status.status_message());
    Ok(())
}
