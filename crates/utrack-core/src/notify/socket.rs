//! Notification transport over TCP with newline-delimited JSON.
//!
//! Client frames: `{"op":"subscribe","group":"<job>"}` and
//! `{"op":"unsubscribe","group":"<job>"}`. Server frames: one `PushMessage`
//! per line. Unparseable server lines are skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::error::{ConnectError, SubscribeError};
use super::message::PushMessage;
use super::{NotificationConnection, NotificationTransport};

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum ClientFrame<'a> {
    Subscribe { group: &'a str },
    Unsubscribe { group: &'a str },
}

/// Connects to a notification server at `host:port` (optionally `tcp://host:port`).
#[derive(Debug, Clone)]
pub struct SocketTransport {
    connect_timeout: Duration,
}

impl SocketTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for SocketTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

fn socket_address(address: &str) -> Result<&str, ConnectError> {
    let addr = address.trim();
    let addr = addr.strip_prefix("tcp://").unwrap_or(addr);
    if addr.is_empty() || !addr.contains(':') {
        return Err(ConnectError::InvalidAddress(address.to_string()));
    }
    Ok(addr)
}

#[async_trait]
impl NotificationTransport for SocketTransport {
    async fn connect(
        &self,
        address: &str,
        events: mpsc::UnboundedSender<PushMessage>,
    ) -> Result<Box<dyn NotificationConnection>, ConnectError> {
        let addr = socket_address(address)?;
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ConnectError::Timeout(self.connect_timeout))?
            .map_err(ConnectError::Unreachable)?;
        let _ = stream.set_nodelay(true);
        let (read_half, write_half) = stream.into_split();
        let reader = tokio::spawn(read_messages(read_half, events));
        Ok(Box::new(SocketConnection {
            writer: Mutex::new(write_half),
            reader,
            closed: AtomicBool::new(false),
        }))
    }
}

struct SocketConnection {
    writer: Mutex<OwnedWriteHalf>,
    reader: JoinHandle<()>,
    closed: AtomicBool,
}

impl SocketConnection {
    async fn send(&self, frame: &ClientFrame<'_>) -> Result<(), SubscribeError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SubscribeError::Closed);
        }
        let mut line = serde_json::to_string(frame)?;
        line.push('\n');
        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(SubscribeError::Send)?;
        writer.flush().await.map_err(SubscribeError::Send)
    }
}

#[async_trait]
impl NotificationConnection for SocketConnection {
    async fn subscribe(&self, group: &str) -> Result<(), SubscribeError> {
        self.send(&ClientFrame::Subscribe { group }).await
    }

    async fn unsubscribe(&self, group: &str) -> Result<(), SubscribeError> {
        self.send(&ClientFrame::Unsubscribe { group }).await
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.reader.abort();
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            tracing::debug!("notification socket shutdown: {}", e);
        }
    }
}

impl Drop for SocketConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_messages(read_half: OwnedReadHalf, events: mpsc::UnboundedSender<PushMessage>) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<PushMessage>(line) {
                    Ok(message) => {
                        if events.send(message).is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::debug!("skipping unparseable push line: {}", e),
                }
            }
            Ok(None) => {
                tracing::debug!("notification server closed the connection");
                return;
            }
            Err(e) => {
                tracing::debug!("notification socket read: {}", e);
                return;
            }
        }
    }
}
