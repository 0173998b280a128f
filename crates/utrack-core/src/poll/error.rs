//! Status query errors and their classification for logging.
//!
//! Every variant is transient from the scheduler's point of view: the query is
//! retried on the next tick and does not consume attempt budget.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollQueryError {
    /// Network-level failure (connect, DNS, timeout, reset).
    #[error("status query transport error: {message}")]
    Transport { message: String, timed_out: bool },
    /// Status endpoint answered with a non-2xx code.
    #[error("status endpoint returned HTTP {0}")]
    Http(u32),
    /// Body could not be decoded or lacked a required field.
    #[error("malformed status response: {0}")]
    Malformed(String),
}

impl From<curl::Error> for PollQueryError {
    fn from(e: curl::Error) -> Self {
        PollQueryError::Transport {
            message: e.to_string(),
            timed_out: e.is_operation_timedout(),
        }
    }
}

impl From<serde_json::Error> for PollQueryError {
    fn from(e: serde_json::Error) -> Self {
        PollQueryError::Malformed(e.to_string())
    }
}

/// Coarse kind used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    Timeout,
    Connection,
    Throttled,
    ServerError,
    ClientError,
    Malformed,
}

/// Classify an HTTP status code returned by the status endpoint.
pub fn classify_http_status(code: u32) -> QueryErrorKind {
    match code {
        429 | 503 => QueryErrorKind::Throttled,
        500..=599 => QueryErrorKind::ServerError,
        _ => QueryErrorKind::ClientError,
    }
}

pub fn classify(e: &PollQueryError) -> QueryErrorKind {
    match e {
        PollQueryError::Transport {
            timed_out: true, ..
        } => QueryErrorKind::Timeout,
        PollQueryError::Transport { .. } => QueryErrorKind::Connection,
        PollQueryError::Http(code) => classify_http_status(*code),
        PollQueryError::Malformed(_) => QueryErrorKind::Malformed,
    }
}
