//! Notification channel client: best-effort server push per job.
//!
//! The transport is an external collaborator behind [`NotificationTransport`];
//! [`NotificationClient`] adds the per-session policy on top (single attempt,
//! job filtering, normalization, explicit teardown). [`SocketTransport`] is a
//! small line-delimited JSON transport over TCP.

mod client;
mod error;
mod message;
mod socket;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use client::NotificationClient;
pub use error::{ConnectError, SubscribeError};
pub use message::{PushKind, PushMessage};
pub use socket::SocketTransport;

/// Opens connections to a notification server.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Connect to `address`. Every message pushed on the connection is sent to
    /// `events` until the connection is closed or dropped.
    async fn connect(
        &self,
        address: &str,
        events: mpsc::UnboundedSender<PushMessage>,
    ) -> Result<Box<dyn NotificationConnection>, ConnectError>;
}

/// An open connection. Groups are job ids.
#[async_trait]
pub trait NotificationConnection: Send + Sync {
    async fn subscribe(&self, group: &str) -> Result<(), SubscribeError>;
    async fn unsubscribe(&self, group: &str) -> Result<(), SubscribeError>;
    /// Release the connection; no more messages are delivered afterwards.
    async fn close(&self);
}
