pub mod config;
pub mod job;
pub mod logging;
pub mod notify;
pub mod poll;
pub mod reconcile;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use job::{JobId, JobOutcome, JobStatus, UploadJob};
pub use reconcile::{SessionObserver, TrackerSnapshot};
pub use tracker::{JobTracker, TrackerSession};
