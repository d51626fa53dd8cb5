//! One subscriber connection.
//!
//! A session moves through `Connecting -> Registered -> Delivering -> Closed`.
//! It is registered with the broker as soon as it is opened. It then writes
//! every message from its queue to the connection until a write fails. That
//! failure is the only way out: the session unregisters, drops its queue and
//! shuts the connection down. A failed write is never retried.
//!
//! There is no idle or heartbeat timeout. A peer that stops reading but
//! keeps the connection open holds its slot until the kernel gives up on it.

use std::io;

use chrono::Utc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace, warn};

use crate::broker::{Broker, Message, SubscriberId, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Registered,
    Delivering,
    Closed,
}

/// What a closed session leaves behind.
#[derive(Debug)]
pub struct SessionSummary {
    pub peer: String,
    pub subscriber: SubscriberId,
    pub delivered: u64,
    /// Messages evicted from the queue before they could be written.
    pub dropped: u64,
    /// The write error that closed the session.
    pub error: io::Error,
}

#[derive(Debug)]
pub struct Session<W> {
    peer: String,
    subscription: Subscription,
    writer: W,
    state: SessionState,
    delivered: u64,
}

impl<W> Session<W>
where
    W: AsyncWrite + Unpin,
{
    /// Registers a new subscriber for `writer`. Every message published
    /// after this returns is queued for it.
    pub fn open(broker: &Broker, writer: W, peer: impl Into<String>) -> Self {
        let peer = peer.into();
        debug!("{peer}: {:?}", SessionState::Connecting);

        let mut session = Self {
            peer,
            subscription: broker.subscribe(),
            writer,
            state: SessionState::Connecting,
            delivered: 0,
        };
        session.set_state(SessionState::Registered);
        session
    }

    pub fn id(&self) -> SubscriberId {
        self.subscription.id()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Delivers queued messages until the first write failure, then closes.
    pub async fn run(mut self) -> SessionSummary {
        self.set_state(SessionState::Delivering);

        let error = loop {
            let msg = self.subscription.recv().await;
            if let Err(e) = self.deliver(&msg).await {
                break e;
            }
            self.delivered += 1;
            trace!(
                lag_ms = (Utc::now() - msg.timestamp()).num_milliseconds(),
                "{}: delivered {}",
                self.peer,
                msg.text()
            );
        };

        warn!("Failed to write to {}: {error}", self.peer);
        self.close(error).await
    }

    async fn deliver(&mut self, msg: &Message) -> io::Result<()> {
        self.writer.write_all(msg.wire_bytes()).await?;
        self.writer.flush().await
    }

    async fn close(mut self, error: io::Error) -> SessionSummary {
        self.set_state(SessionState::Closed);

        let Session {
            peer,
            subscription,
            mut writer,
            delivered,
            ..
        } = self;

        let subscriber = subscription.id();
        let dropped = subscription.queue().dropped();
        drop(subscription);

        // The peer is most likely gone already.
        let _ = writer.shutdown().await;

        SessionSummary {
            peer,
            subscriber,
            delivered,
            dropped,
            error,
        }
    }

    fn set_state(&mut self, next: SessionState) {
        debug!("{}: {:?} -> {:?}", self.peer, self.state, next);
        self.state = next;
    }
}
