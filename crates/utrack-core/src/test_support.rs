//! Instrumented doubles for the push transport and the status query.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::job::{JobId, JobStatus};
use crate::notify::{
    ConnectError, NotificationConnection, NotificationTransport, PushMessage, SubscribeError,
};
use crate::poll::{PollQueryError, StatusQuery};

#[derive(Default)]
pub(crate) struct TransportCounters {
    pub connects: AtomicU32,
    pub subscribes: AtomicU32,
    pub unsubscribes: AtomicU32,
    pub closes: AtomicU32,
    /// One slot per connection; `None` once that connection is closed.
    senders: Mutex<Vec<Option<mpsc::UnboundedSender<PushMessage>>>>,
}

impl TransportCounters {
    pub fn get(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

/// Transport double: optionally fails connect or subscribe, optionally delays
/// either handshake step, and lets the test push messages while connected.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    pub fail_connect: bool,
    pub fail_subscribe: bool,
    pub connect_delay: Option<Duration>,
    pub subscribe_delay: Option<Duration>,
    pub counters: Arc<TransportCounters>,
}

impl FakeTransport {
    pub fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Self::default()
        }
    }

    /// Deliver a message to every live connection, as a multiplexed server
    /// would. False if nothing was delivered.
    pub fn push(&self, message: PushMessage) -> bool {
        let senders = self.counters.senders.lock().unwrap();
        let mut delivered = false;
        for tx in senders.iter().flatten() {
            delivered |= tx.send(message.clone()).is_ok();
        }
        delivered
    }

    pub fn connects(&self) -> u32 {
        TransportCounters::get(&self.counters.connects)
    }

    pub fn subscribes(&self) -> u32 {
        TransportCounters::get(&self.counters.subscribes)
    }

    pub fn unsubscribes(&self) -> u32 {
        TransportCounters::get(&self.counters.unsubscribes)
    }

    pub fn closes(&self) -> u32 {
        TransportCounters::get(&self.counters.closes)
    }
}

#[async_trait]
impl NotificationTransport for FakeTransport {
    async fn connect(
        &self,
        _address: &str,
        events: mpsc::UnboundedSender<PushMessage>,
    ) -> Result<Box<dyn NotificationConnection>, ConnectError> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_connect {
            return Err(ConnectError::Unreachable(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            )));
        }
        let slot = {
            let mut senders = self.counters.senders.lock().unwrap();
            senders.push(Some(events));
            senders.len() - 1
        };
        Ok(Box::new(FakeConnection {
            fail_subscribe: self.fail_subscribe,
            subscribe_delay: self.subscribe_delay,
            slot,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct FakeConnection {
    fail_subscribe: bool,
    subscribe_delay: Option<Duration>,
    slot: usize,
    counters: Arc<TransportCounters>,
}

#[async_trait]
impl NotificationConnection for FakeConnection {
    async fn subscribe(&self, _group: &str) -> Result<(), SubscribeError> {
        if let Some(delay) = self.subscribe_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_subscribe {
            return Err(SubscribeError::Closed);
        }
        self.counters.subscribes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unsubscribe(&self, _group: &str) -> Result<(), SubscribeError> {
        self.counters.unsubscribes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        self.counters.senders.lock().unwrap()[self.slot].take();
    }
}

/// Replays scripted results, then repeats `fallback` forever.
pub(crate) struct ScriptedQuery {
    script: Mutex<VecDeque<Result<JobStatus, PollQueryError>>>,
    fallback: JobStatus,
    calls: AtomicU32,
}

impl ScriptedQuery {
    pub fn new(script: Vec<Result<JobStatus, PollQueryError>>, fallback: JobStatus) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicU32::new(0),
        })
    }

    pub fn pending() -> Arc<Self> {
        Self::new(Vec::new(), JobStatus::Pending)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusQuery for ScriptedQuery {
    async fn query(&self, _job_id: &JobId) -> Result<JobStatus, PollQueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
