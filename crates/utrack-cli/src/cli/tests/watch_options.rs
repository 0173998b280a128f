use std::time::Duration;

use utrack_core::config::TrackerConfig;

use crate::cli::commands::watch::{channel_address, poll_settings};
use crate::cli::commands::WatchOptions;

fn cfg_with_channel() -> TrackerConfig {
    TrackerConfig {
        notification_address: Some("push.example:7000".into()),
        ..TrackerConfig::default()
    }
}

#[test]
fn channel_falls_back_to_config() {
    let cfg = cfg_with_channel();
    assert_eq!(channel_address(&cfg, &WatchOptions::default()), "push.example:7000");

    let opts = WatchOptions {
        channel: Some("other:1".into()),
        ..WatchOptions::default()
    };
    assert_eq!(channel_address(&cfg, &opts), "other:1");
}

#[test]
fn no_push_yields_empty_channel() {
    let opts = WatchOptions {
        no_push: true,
        ..WatchOptions::default()
    };
    assert_eq!(channel_address(&cfg_with_channel(), &opts), "");
    assert_eq!(channel_address(&TrackerConfig::default(), &WatchOptions::default()), "");
}

#[test]
fn interval_override_moves_default_initial_delay() {
    let opts = WatchOptions {
        interval_ms: Some(300),
        max_attempts: Some(5),
        ..WatchOptions::default()
    };
    let settings = poll_settings(&TrackerConfig::default(), &opts).unwrap();
    assert_eq!(settings.interval, Duration::from_millis(300));
    assert_eq!(settings.initial_delay, Duration::from_millis(300));
    assert_eq!(settings.max_attempts, 5);
}

#[test]
fn explicit_initial_delay_survives_interval_override() {
    let mut cfg = TrackerConfig::default();
    cfg.poll.initial_delay_ms = Some(0);
    let opts = WatchOptions {
        interval_ms: Some(300),
        ..WatchOptions::default()
    };
    let settings = poll_settings(&cfg, &opts).unwrap();
    assert_eq!(settings.initial_delay, Duration::ZERO);
}

#[test]
fn zero_overrides_are_rejected() {
    let cfg = TrackerConfig::default();
    let zero_interval = WatchOptions {
        interval_ms: Some(0),
        ..WatchOptions::default()
    };
    assert!(poll_settings(&cfg, &zero_interval).is_err());
    let zero_attempts = WatchOptions {
        max_attempts: Some(0),
        ..WatchOptions::default()
    };
    assert!(poll_settings(&cfg, &zero_attempts).is_err());
}
