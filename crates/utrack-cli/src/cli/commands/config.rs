//! `utrack config` – show where the config lives and what is in effect.

use anyhow::Result;
use utrack_core::config::{self, TrackerConfig};

pub fn run_config(cfg: &TrackerConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    println!("status_base_url:      {}", cfg.status_base_url);
    println!(
        "notification_address: {}",
        cfg.notification_address.as_deref().unwrap_or("-")
    );
    let poll = cfg.poll.settings();
    println!(
        "poll:                 every {} ms (first after {} ms), {} attempts",
        poll.interval.as_millis(),
        poll.initial_delay.as_millis(),
        poll.max_attempts
    );
    println!(
        "http timeouts:        connect {}s, total {}s",
        cfg.http.connect_timeout_secs, cfg.http.timeout_secs
    );
    println!("push connect timeout: {}s", cfg.notify.connect_timeout_secs);
    Ok(())
}
