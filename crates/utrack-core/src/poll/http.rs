//! Job status query over HTTP (libcurl).

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::job::{JobId, JobStatus};

use super::error::PollQueryError;
use super::response::StatusResponse;
use super::StatusQuery;

/// `GET <base>/<job id>` returning a JSON `StatusResponse`.
#[derive(Debug, Clone)]
pub struct HttpStatusQuery {
    base: Url,
    connect_timeout: Duration,
    timeout: Duration,
}

impl HttpStatusQuery {
    pub fn new(base: Url, connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            base,
            connect_timeout,
            timeout,
        }
    }

    /// Status URL for one job; the id is percent-encoded as a single path segment.
    pub fn status_url(&self, job_id: &JobId) -> Result<Url, PollQueryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PollQueryError::Malformed(format!("base URL cannot carry a path: {}", self.base)))?
            .pop_if_empty()
            .push(job_id.as_str());
        Ok(url)
    }

    /// Blocking fetch; call from `spawn_blocking` when used from async code.
    pub fn fetch(&self, job_id: &JobId) -> Result<StatusResponse, PollQueryError> {
        let url = self.status_url(job_id)?;
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(PollQueryError::Http(code));
        }

        StatusResponse::from_slice(&body)
    }
}

#[async_trait]
impl StatusQuery for HttpStatusQuery {
    async fn query(&self, job_id: &JobId) -> Result<JobStatus, PollQueryError> {
        let this = self.clone();
        let id = job_id.clone();
        let response = tokio::task::spawn_blocking(move || this.fetch(&id))
            .await
            .map_err(|e| PollQueryError::Transport {
                message: format!("status query task join: {}", e),
                timed_out: false,
            })??;
        response.into_status()
    }
}
