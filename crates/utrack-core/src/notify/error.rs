//! Push channel errors. None of these are fatal to tracking: the caller logs
//! them and continues poll-only.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid notification address {0:?}")]
    InvalidAddress(String),
    #[error("notification channel unreachable: {0}")]
    Unreachable(#[source] std::io::Error),
    #[error("notification connect timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("failed to send subscription frame: {0}")]
    Send(#[source] std::io::Error),
    #[error("notification connection already closed")]
    Closed,
    #[error("failed to encode subscription frame: {0}")]
    Encode(#[from] serde_json::Error),
}
