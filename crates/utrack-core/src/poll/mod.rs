//! Poll scheduler: periodic status queries, bounded by attempt count.
//!
//! The first query fires after `initial_delay`; every response (success or
//! error) re-arms the timer with `interval`. Successful non-terminal results
//! consume budget; errors do not. When the budget runs out a
//! `Failed { message: "timeout", retryable: false }` event is synthesized.

mod error;
mod http;
mod response;
mod scheduler;

use async_trait::async_trait;

use crate::job::{JobId, JobStatus};

pub use error::{classify, classify_http_status, PollQueryError, QueryErrorKind};
pub use http::HttpStatusQuery;
pub use response::{RemoteState, StatusResponse};
pub use scheduler::{start, PollExit, PollHandle, PollSettings, PollSummary};

/// One status query against the backend.
#[async_trait]
pub trait StatusQuery: Send + Sync {
    async fn query(&self, job_id: &JobId) -> Result<JobStatus, PollQueryError>;
}
